//! Reddit Trust - subreddit trust report generator
//!
//! Collects the top submissions of a subreddit for a timeframe and renders
//! a PDF report of author account ages, the most active authors, the most
//! linked sources and word clouds of titles and comments.
//!
//! Exit codes:
//!   0 - Report written
//!   1 - Runtime error (config, network, empty data, write failure)
//!   2 - Usage error

mod analysis;
mod cli;
mod config;
mod forum;
mod models;
mod progress;
mod report;

use analysis::ReportData;
use anyhow::{Context, Result};
use chrono::Local;
use cli::Args;
use config::Config;
use forum::{ForumClient, RedditClient};
use models::{Submission, Timeframe, DELETED_AUTHOR};
use progress::announce;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    init_logging();

    info!("Reddit Trust v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Run failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Log to stderr, filtered by RUST_LOG (warnings only by default).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

async fn run(args: Args) -> Result<()> {
    let config_path = Config::default_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load(&config_path)?;

    let subreddit = cli::resolve_subreddit(&args, config.report.default_subreddit.as_deref())?;
    let timeframe = args.timeframe;

    announce("Collecting Subreddit Data");
    let client = RedditClient::connect(&config.bot, &config.api)
        .await
        .context("Failed to connect to Reddit")?;
    let submissions = collect(&client, &subreddit, timeframe).await?;

    announce("Generating Report");
    let path = report_path(&config.report.output_dir, Local::now());
    generate(&config, &subreddit, timeframe, &submissions, &path)?;

    announce("Report Complete");
    println!("Report saved to: {}", path.display());
    Ok(())
}

/// Fetch the top submissions through any forum client.
async fn collect<C: ForumClient>(
    client: &C,
    subreddit: &str,
    timeframe: Timeframe,
) -> Result<Vec<Submission>> {
    let submissions = client
        .fetch_top(subreddit, timeframe)
        .await
        .with_context(|| format!("Failed to collect submissions of /r/{}", subreddit))?;
    info!("Collected {} submissions", submissions.len());
    Ok(submissions)
}

/// Normalize, aggregate and render `submissions` into a report at `path`.
fn generate(
    config: &Config,
    subreddit: &str,
    timeframe: Timeframe,
    submissions: &[Submission],
    path: &Path,
) -> Result<()> {
    let records = analysis::normalize(submissions, config.report.comment_score_threshold);
    let data = ReportData::from_records(&records, config.report.top_n);
    debug!(
        "Aggregated {} authors, {} domains, {} account months",
        data.top_authors.len(),
        data.top_domains.len(),
        data.account_ages.len()
    );
    debug!(
        "Top authors cover {} submissions, {} by deleted accounts",
        data.top_authors.total(),
        data.top_authors.get(DELETED_AUTHOR).unwrap_or(0)
    );

    let pages = report::build_pages(subreddit, timeframe, &data, config.report.on_empty);
    let title = format!("Reddit Trust Report - /r/{}", subreddit);
    report::write_report(path, &title, &pages)
}

fn report_path(output_dir: &Path, started: chrono::DateTime<Local>) -> PathBuf {
    output_dir.join(report::report_file_name(started))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forum::ForumError;
    use crate::models::{Author, AuthorLookup, Comment};
    use chrono::{TimeZone, Utc};

    const CONFIG: &str = r#"
[bot]
client_id = "id"
client_secret = "secret"
"#;

    struct FakeForum {
        submissions: Vec<Submission>,
    }

    impl ForumClient for FakeForum {
        async fn fetch_top(
            &self,
            subreddit: &str,
            _timeframe: Timeframe,
        ) -> forum::Result<Vec<Submission>> {
            if subreddit == "private_sub" {
                return Err(ForumError::SubredditUnavailable(subreddit.to_string()));
            }
            Ok(self.submissions.clone())
        }
    }

    fn submission(id: &str, author: AuthorLookup, url: &str, score: i64) -> Submission {
        Submission {
            id: id.to_string(),
            score,
            title: format!("Release notes for project {}", id),
            url: url.to_string(),
            author,
            comments: vec![
                Comment {
                    body: "Thanks for sharing this update".to_string(),
                    score: 25,
                },
                Comment {
                    body: "meh".to_string(),
                    score: 2,
                },
            ],
        }
    }

    fn forum() -> FakeForum {
        let alice = AuthorLookup::Resolved(Author {
            name: "alice".to_string(),
            created_at: Some(Utc.timestamp_opt(1_262_304_000, 0).unwrap()),
        });
        FakeForum {
            submissions: vec![
                submission("a", alice.clone(), "https://example.com/a", 50),
                submission("b", alice, "https://example.com/b", 40),
                submission("c", AuthorLookup::Deleted, "https://other.org/c", 30),
            ],
        }
    }

    #[test]
    fn test_pipeline_writes_report() {
        let config = Config::parse(CONFIG).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let started = Local.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let path = report_path(dir.path(), started);

        let submissions =
            tokio_test::block_on(collect(&forum(), "rust", Timeframe::Day)).unwrap();
        assert_eq!(submissions.len(), 3);

        generate(&config, "rust", Timeframe::Day, &submissions, &path).unwrap();

        assert_eq!(path.file_name().unwrap(), "20240506_070809.pdf");
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn test_unavailable_subreddit_is_reported() {
        let err = tokio_test::block_on(collect(&forum(), "private_sub", Timeframe::Day))
            .unwrap_err();
        assert!(err.to_string().contains("/r/private_sub"));
        assert!(matches!(
            err.downcast_ref::<ForumError>(),
            Some(ForumError::SubredditUnavailable(_))
        ));
    }

    #[test]
    fn test_empty_listing_aborts_without_report() {
        let config = Config::parse(CONFIG).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = report_path(dir.path(), Local::now());
        let empty = FakeForum {
            submissions: vec![],
        };

        let submissions = tokio_test::block_on(collect(&empty, "rust", Timeframe::All)).unwrap();
        assert!(generate(&config, "rust", Timeframe::All, &submissions, &path).is_err());
        assert!(!path.exists());
    }
}
