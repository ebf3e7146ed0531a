//! PDF report assembly.
//!
//! Each page is rendered in order onto an in-memory document. The document
//! is persisted only after every page succeeded, via a temporary file in
//! the destination directory that is renamed into place.

use super::backend::PdfBackend;
use super::charts::{draw_bar_chart, draw_line_chart, draw_text_page, BarChart, LineChart};
use super::wordcloud::draw_word_cloud;
use super::ReportError;
use crate::analysis::ReportData;
use crate::config::EmptyInputPolicy;
use crate::models::{AggregateTable, TextCorpus, Timeframe, YearMonth};
use crate::progress::announce;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use plotters::coord::Shift;
use plotters::prelude::*;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Pixel canvas every page is laid out on.
pub const CANVAS: (u32, u32) = (1600, 800);

/// Physical page size (A4 width, 2:1 like the canvas).
const PAGE_MM: (f32, f32) = (297.0, 148.5);

pub type PdfArea = DrawingArea<PdfBackend, Shift>;

/// One page of the report.
pub trait ReportPage {
    /// Progress message printed before the page is drawn.
    fn label(&self) -> &str;

    fn draw(&self, area: &PdfArea) -> Result<()>;
}

struct CoverPage {
    lines: Vec<String>,
}

impl ReportPage for CoverPage {
    fn label(&self) -> &str {
        "Creating cover page"
    }

    fn draw(&self, area: &PdfArea) -> Result<()> {
        draw_text_page(area, &self.lines)
    }
}

struct AccountAgePage {
    series: Vec<(YearMonth, usize)>,
    policy: EmptyInputPolicy,
}

impl ReportPage for AccountAgePage {
    fn label(&self) -> &str {
        "Plotting age of author accounts"
    }

    fn draw(&self, area: &PdfArea) -> Result<()> {
        let chart = LineChart {
            title: "Account Creation Dates of Authors of Top Submissions",
            x_desc: "Date Created",
            y_desc: "Number of Accounts",
            series: &self.series,
        };
        draw_line_chart(area, &chart, self.policy)
    }
}

struct BarChartPage {
    label: &'static str,
    title: &'static str,
    x_desc: &'static str,
    y_desc: &'static str,
    table: AggregateTable,
    policy: EmptyInputPolicy,
}

impl ReportPage for BarChartPage {
    fn label(&self) -> &str {
        self.label
    }

    fn draw(&self, area: &PdfArea) -> Result<()> {
        let chart = BarChart {
            title: self.title,
            x_desc: self.x_desc,
            y_desc: self.y_desc,
            table: &self.table,
        };
        draw_bar_chart(area, &chart, self.policy)
    }
}

struct WordCloudPage {
    label: &'static str,
    title: &'static str,
    corpus: TextCorpus,
    policy: EmptyInputPolicy,
}

impl ReportPage for WordCloudPage {
    fn label(&self) -> &str {
        self.label
    }

    fn draw(&self, area: &PdfArea) -> Result<()> {
        draw_word_cloud(area, self.title, &self.corpus, self.policy)
    }
}

/// Text of the cover page.
pub fn cover_lines(subreddit: &str, timeframe: Timeframe, submission_count: usize) -> Vec<String> {
    vec![
        "Reddit Trust Report".to_string(),
        format!("/r/{}", subreddit),
        format!("Submission data: past {}", timeframe),
        format!("Total submission objects analyzed: {}", submission_count),
    ]
}

/// All report pages in their fixed order.
pub fn build_pages(
    subreddit: &str,
    timeframe: Timeframe,
    data: &ReportData,
    policy: EmptyInputPolicy,
) -> Vec<Box<dyn ReportPage>> {
    vec![
        Box::new(CoverPage {
            lines: cover_lines(subreddit, timeframe, data.submission_count),
        }),
        Box::new(AccountAgePage {
            series: data.account_ages.clone(),
            policy,
        }),
        Box::new(BarChartPage {
            label: "Plotting number of posts by author",
            title: "Authors With the Most Submissions",
            x_desc: "Author",
            y_desc: "Number of Submissions in subreddit",
            table: data.top_authors.clone(),
            policy,
        }),
        Box::new(BarChartPage {
            label: "Plotting top links",
            title: "Most Used Sources in Top Submissions",
            x_desc: "Source",
            y_desc: "Number of Submissions",
            table: data.top_domains.clone(),
            policy,
        }),
        Box::new(WordCloudPage {
            label: "Creating title wordcloud",
            title: "Submission Titles Wordcloud",
            corpus: data.titles.clone(),
            policy,
        }),
        Box::new(WordCloudPage {
            label: "Creating comment wordcloud",
            title: "Submission Comments Wordcloud",
            corpus: data.comments.clone(),
            policy,
        }),
    ]
}

/// File name for a report started at `started`.
pub fn report_file_name(started: DateTime<Local>) -> String {
    started.format("%Y%m%d_%H%M%S.pdf").to_string()
}

/// Render `pages` into one PDF at `path`.
///
/// Nothing is written when any page fails.
pub fn write_report(path: &Path, title: &str, pages: &[Box<dyn ReportPage>]) -> Result<()> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_MM.0), Mm(PAGE_MM.1), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Pdf(format!("{:?}", e)))?;

    for (index, page) in pages.iter().enumerate() {
        announce(page.label());

        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_MM.0), Mm(PAGE_MM.1), "Layer 1")
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        let area = PdfBackend::new(layer, font.clone(), CANVAS, PAGE_MM).into_drawing_area();
        page.draw(&area)
            .with_context(|| format!("Failed on page {}: {}", index + 1, page.label()))?;
        area.present()?;
        debug!("Rendered page {}", index + 1);
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        doc.save(&mut writer)
            .map_err(|e| ReportError::Pdf(format!("{:?}", e)))?;
        writer.flush()?;
    }

    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    info!("Report written to {}", path.display());
    Ok(())
}
