//! Chart and text page renderers.
//!
//! Renderers draw onto any plotters drawing area, so the same code
//! produces the PDF pages and the SVG used in tests.

use super::ReportError;
use crate::config::EmptyInputPolicy;
use crate::models::{AggregateTable, YearMonth};
use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

pub const FONT: &str = "sans-serif";
pub const TITLE_SIZE: f64 = 36.0;
const AXIS_DESC_SIZE: f64 = 22.0;
const LABEL_SIZE: f64 = 18.0;
const NOTICE_SIZE: f64 = 28.0;
const COVER_SIZE: f64 = 40.0;

const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);
const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Longest category label printed under a bar.
const MAX_LABEL_CHARS: usize = 22;

/// Input for a top-N bar chart.
#[derive(Debug, Clone, Copy)]
pub struct BarChart<'a> {
    pub title: &'a str,
    pub x_desc: &'a str,
    pub y_desc: &'a str,
    pub table: &'a AggregateTable,
}

/// Input for the account-creation line chart.
#[derive(Debug, Clone, Copy)]
pub struct LineChart<'a> {
    pub title: &'a str,
    pub x_desc: &'a str,
    pub y_desc: &'a str,
    pub series: &'a [(YearMonth, usize)],
}

/// Upper bound of an integer count axis, leaving headroom above the tallest value.
pub fn count_axis_end(max: usize) -> u32 {
    max as u32 + 1
}

/// Category label as printed on the x axis.
pub fn display_label(category: &str) -> String {
    if category.is_empty() {
        return "(none)".to_string();
    }
    if category.chars().count() > MAX_LABEL_CHARS {
        let cut: String = category.chars().take(MAX_LABEL_CHARS - 3).collect();
        return format!("{}...", cut);
    }
    category.to_string()
}

/// Handle a page with nothing to plot according to `policy`.
pub fn draw_empty<DB>(area: &DrawingArea<DB, Shift>, title: &str, policy: EmptyInputPolicy) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    match policy {
        EmptyInputPolicy::Abort => Err(ReportError::EmptyInput(title.to_string()).into()),
        EmptyInputPolicy::Placeholder => {
            let body = area.titled(title, (FONT, TITLE_SIZE))?;
            let (width, height) = body.dim_in_pixel();
            let style = (FONT, NOTICE_SIZE)
                .into_font()
                .color(&BLACK.mix(0.6))
                .pos(Pos::new(HPos::Center, VPos::Center));
            body.draw(&Text::new(
                "No data available",
                (width as i32 / 2, height as i32 / 2),
                style,
            ))?;
            Ok(())
        }
    }
}

/// Vertical bars, one per category, with integer count ticks.
pub fn draw_bar_chart<DB>(
    area: &DrawingArea<DB, Shift>,
    chart: &BarChart<'_>,
    policy: EmptyInputPolicy,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    area.fill(&WHITE)?;

    if chart.table.is_empty() {
        return draw_empty(area, chart.title, policy);
    }
    let entries = chart.table.entries();

    let labels: Vec<String> = entries.iter().map(|(name, _)| display_label(name)).collect();
    let max = entries.iter().map(|(_, count)| *count).max().unwrap_or(0);

    let mut ctx = ChartBuilder::on(area)
        .caption(chart.title, (FONT, TITLE_SIZE))
        .margin(30)
        .x_label_area_size(90)
        .y_label_area_size(90)
        .build_cartesian_2d(
            (0u32..entries.len() as u32).into_segmented(),
            0u32..count_axis_end(max),
        )?;

    let x_formatter = |value: &SegmentValue<u32>| -> String {
        match value {
            SegmentValue::CenterOf(index) => {
                labels.get(*index as usize).cloned().unwrap_or_default()
            }
            _ => String::new(),
        }
    };

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(entries.len())
        .x_label_formatter(&x_formatter)
        .x_label_style((FONT, LABEL_SIZE))
        .y_label_style((FONT, LABEL_SIZE))
        .x_desc(chart.x_desc)
        .y_desc(chart.y_desc)
        .axis_desc_style((FONT, AXIS_DESC_SIZE))
        .draw()?;

    ctx.draw_series(
        Histogram::vertical(&ctx)
            .style(BAR_COLOR.filled())
            .margin(12)
            .data(
                entries
                    .iter()
                    .enumerate()
                    .map(|(index, (_, count))| (index as u32, *count as u32)),
            ),
    )?;

    Ok(())
}

/// Counts per month as a time series with integer count ticks.
pub fn draw_line_chart<DB>(
    area: &DrawingArea<DB, Shift>,
    chart: &LineChart<'_>,
    policy: EmptyInputPolicy,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    area.fill(&WHITE)?;

    let (first, last) = match (chart.series.first(), chart.series.last()) {
        (Some(first), Some(last)) => (first.0.ordinal(), last.0.ordinal()),
        _ => return draw_empty(area, chart.title, policy),
    };
    let max = chart.series.iter().map(|(_, count)| *count).max().unwrap_or(0);

    let mut ctx = ChartBuilder::on(area)
        .caption(chart.title, (FONT, TITLE_SIZE))
        .margin(30)
        .x_label_area_size(70)
        .y_label_area_size(90)
        .build_cartesian_2d(first..last + 1, 0u32..count_axis_end(max))?;

    let x_formatter = |ordinal: &i32| YearMonth::from_ordinal(*ordinal).to_string();

    ctx.configure_mesh()
        .x_labels(10)
        .x_label_formatter(&x_formatter)
        .x_label_style((FONT, LABEL_SIZE))
        .y_label_style((FONT, LABEL_SIZE))
        .x_desc(chart.x_desc)
        .y_desc(chart.y_desc)
        .axis_desc_style((FONT, AXIS_DESC_SIZE))
        .draw()?;

    ctx.draw_series(LineSeries::new(
        chart
            .series
            .iter()
            .map(|(month, count)| (month.ordinal(), *count as u32)),
        LINE_COLOR.stroke_width(3),
    ))?;

    Ok(())
}

/// Centered block of text lines; the first line is set larger.
pub fn draw_text_page<DB>(area: &DrawingArea<DB, Shift>, lines: &[String]) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    area.fill(&WHITE)?;

    let (width, height) = area.dim_in_pixel();
    let line_height = (COVER_SIZE * 1.6) as i32;
    let block = line_height * lines.len().saturating_sub(1) as i32;
    let mut y = height as i32 / 2 - block / 2;

    for (index, line) in lines.iter().enumerate() {
        let size = if index == 0 { COVER_SIZE * 1.25 } else { COVER_SIZE };
        let style = (FONT, size)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        area.draw(&Text::new(line.as_str(), (width as i32 / 2, y), style))?;
        y += line_height;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F>(draw: F) -> String
    where
        F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> Result<()>,
    {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (1600, 800)).into_drawing_area();
            draw(&root).unwrap();
            root.present().unwrap();
        }
        svg
    }

    fn table() -> AggregateTable {
        AggregateTable::from_counts(vec![
            ("alice".to_string(), 3),
            ("[deleted]".to_string(), 2),
            ("bob".to_string(), 1),
        ])
    }

    #[test]
    fn test_bar_chart_renders_title_and_labels() {
        let table = table();
        let chart = BarChart {
            title: "Authors With the Most Submissions",
            x_desc: "Author",
            y_desc: "Number of Submissions in subreddit",
            table: &table,
        };
        let svg = render(|area| draw_bar_chart(area, &chart, EmptyInputPolicy::Abort));

        assert!(svg.contains("Authors With the Most Submissions"));
        assert!(svg.contains("alice"));
        assert!(svg.contains("[deleted]"));
        assert!(svg.contains("<rect"));
    }

    #[test]
    fn test_line_chart_renders_month_labels() {
        let series = vec![
            (YearMonth { year: 2015, month: 3 }, 2),
            (YearMonth { year: 2016, month: 1 }, 1),
        ];
        let chart = LineChart {
            title: "Account Creation Dates of Authors of Top Submissions",
            x_desc: "Date Created",
            y_desc: "Number of Accounts",
            series: &series,
        };
        let svg = render(|area| draw_line_chart(area, &chart, EmptyInputPolicy::Abort));

        assert!(svg.contains("Account Creation Dates of Authors of Top Submissions"));
        assert!(svg.contains("2015-"));
        assert!(svg.contains("<polyline") || svg.contains("<path"));
    }

    #[test]
    fn test_single_month_series_renders() {
        let series = vec![(YearMonth { year: 2010, month: 1 }, 1)];
        let chart = LineChart {
            title: "Ages",
            x_desc: "Date Created",
            y_desc: "Number of Accounts",
            series: &series,
        };
        let svg = render(|area| draw_line_chart(area, &chart, EmptyInputPolicy::Abort));
        assert!(svg.contains("2010-01"));
    }

    #[test]
    fn test_empty_table_aborts_by_default() {
        let table = AggregateTable::default();
        let chart = BarChart {
            title: "Most Used Sources in Top Submissions",
            x_desc: "Source",
            y_desc: "Number of Submissions",
            table: &table,
        };

        let mut svg = String::new();
        let root = SVGBackend::with_string(&mut svg, (1600, 800)).into_drawing_area();
        let err = draw_bar_chart(&root, &chart, EmptyInputPolicy::Abort).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReportError>(),
            Some(ReportError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_empty_table_placeholder() {
        let table = AggregateTable::default();
        let chart = BarChart {
            title: "Most Used Sources in Top Submissions",
            x_desc: "Source",
            y_desc: "Number of Submissions",
            table: &table,
        };
        let svg = render(|area| draw_bar_chart(area, &chart, EmptyInputPolicy::Placeholder));
        assert!(svg.contains("Most Used Sources in Top Submissions"));
        assert!(svg.contains("No data available"));
    }

    #[test]
    fn test_text_page() {
        let lines = vec!["Reddit Trust Report".to_string(), "/r/rust".to_string()];
        let svg = render(|area| draw_text_page(area, &lines));
        assert!(svg.contains("Reddit Trust Report"));
        assert!(svg.contains("/r/rust"));
    }

    #[test]
    fn test_display_label() {
        assert_eq!(display_label(""), "(none)");
        assert_eq!(display_label("example.com"), "example.com");
        let long = display_label("a-very-long-domain-name.example.com");
        assert_eq!(long.chars().count(), MAX_LABEL_CHARS);
        assert!(long.ends_with("..."));
        assert!(long.is_ascii());
    }

    #[test]
    fn test_count_axis_end_leaves_headroom() {
        assert_eq!(count_axis_end(0), 1);
        assert_eq!(count_axis_end(7), 8);
    }
}
