//! Data models for the subreddit report.
//!
//! This module contains the forum records handed over by the client and
//! the normalized, immutable records the aggregators work on.

use chrono::{DateTime, Datelike, Utc};
use std::fmt;

/// Name used for submissions whose author is gone or could not be resolved.
pub const DELETED_AUTHOR: &str = "[deleted]";

/// Lookback window for the top listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Timeframe {
    /// Past 24 hours (default)
    #[default]
    Day,
    /// Past month
    Month,
    /// Past year
    Year,
    /// All time
    All,
}

impl Timeframe {
    /// Value of the `t` query parameter for listing endpoints.
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Day => "day",
            Timeframe::Month => "month",
            Timeframe::Year => "year",
            Timeframe::All => "all",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account that posted a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    /// Account name.
    pub name: String,
    /// Account creation time, absent for suspended or hidden accounts.
    pub created_at: Option<DateTime<Utc>>,
}

/// Outcome of resolving the author of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorLookup {
    /// The account exists and its profile was fetched.
    Resolved(Author),
    /// The forum reports the author as deleted.
    Deleted,
    /// The profile lookup failed; carries the reason for diagnostics.
    Unavailable(String),
}

/// A top-level comment on a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub body: String,
    pub score: i64,
}

/// A single submission as returned by the forum client.
#[derive(Debug, Clone)]
pub struct Submission {
    pub id: String,
    pub score: i64,
    pub title: String,
    pub url: String,
    pub author: AuthorLookup,
    /// Top-level comments, with all "load more" placeholders expanded.
    pub comments: Vec<Comment>,
}

/// Report-ready view of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    /// Author name, or [`DELETED_AUTHOR`].
    pub author_name: String,
    pub author_created_at: Option<DateTime<Utc>>,
    pub title: String,
    /// `host[:port]` of the submission URL; empty for malformed URLs.
    pub link_domain: String,
    /// Bodies of top-level comments that passed the score threshold.
    pub comment_bodies: Vec<String>,
}

/// Calendar month bucket used by the account-age histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Bucket containing the given instant (UTC).
    pub fn of(at: &DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    /// Months since year zero, handy as a continuous chart coordinate.
    pub fn ordinal(&self) -> i32 {
        self.year * 12 + self.month as i32 - 1
    }

    /// Inverse of [`YearMonth::ordinal`].
    pub fn from_ordinal(ordinal: i32) -> Self {
        Self {
            year: ordinal.div_euclid(12),
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Category → count table, sorted by count (descending) then category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateTable {
    entries: Vec<(String, usize)>,
}

impl AggregateTable {
    /// Build a table from raw counts, applying the canonical ordering.
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (String, usize)>,
    {
        let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Self { entries }
    }

    /// Keep only the first `n` buckets.
    pub fn top(mut self, n: usize) -> Self {
        self.entries.truncate(n);
        self
    }

    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }

    pub fn get(&self, category: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, count)| *count)
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Concatenated text fed to a word cloud.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextCorpus(String);

impl TextCorpus {
    pub fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the corpus holds no visible characters.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}
