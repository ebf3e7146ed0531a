//! Analysis modules.
//!
//! Normalization of forum submissions and the aggregations built on top.

pub mod aggregator;
pub mod normalizer;

pub use aggregator::ReportData;
pub use normalizer::normalize;
