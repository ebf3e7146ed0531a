//! Report rendering.
//!
//! Charts and word clouds are drawn with plotters onto pages of a single
//! PDF document, which is only written to disk once every page succeeded.

pub mod backend;
pub mod charts;
pub mod generator;
pub mod wordcloud;

pub use generator::{build_pages, report_file_name, write_report};

use thiserror::Error;

/// Errors raised while building the report document.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Nothing to plot for \"{0}\"")]
    EmptyInput(String),

    #[error("Failed to write PDF: {0}")]
    Pdf(String),
}
