//! Aggregation of normalized records into report tables.
//!
//! Every function here is pure: it reads the normalized records and
//! returns a fresh table or corpus.

use crate::models::{AggregateTable, NormalizedRecord, TextCorpus, YearMonth};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Distinct `(author, created_at)` pairs, in first-seen order.
///
/// Records without a creation time are dropped.
pub fn dedup_author_ages(records: &[NormalizedRecord]) -> Vec<(String, DateTime<Utc>)> {
    let pairs: Vec<(String, DateTime<Utc>)> = records
        .iter()
        .filter_map(|r| r.author_created_at.map(|at| (r.author_name.clone(), at)))
        .collect();
    dedup_pairs(pairs)
}

/// Remove repeated pairs, keeping the first occurrence.
pub fn dedup_pairs(pairs: Vec<(String, DateTime<Utc>)>) -> Vec<(String, DateTime<Utc>)> {
    let mut seen = HashSet::new();
    pairs
        .into_iter()
        .filter(|pair| seen.insert(pair.clone()))
        .collect()
}

/// Accounts per creation month, in chronological order.
pub fn account_age_histogram(records: &[NormalizedRecord]) -> Vec<(YearMonth, usize)> {
    let mut months: BTreeMap<YearMonth, usize> = BTreeMap::new();

    for (_, created_at) in dedup_author_ages(records) {
        *months.entry(YearMonth::of(&created_at)).or_default() += 1;
    }

    months.into_iter().collect()
}

/// Count records per key, ordered by count then key.
fn count_by<'a, F>(records: &'a [NormalizedRecord], key: F) -> AggregateTable
where
    F: Fn(&'a NormalizedRecord) -> &'a str,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for record in records {
        *counts.entry(key(record)).or_default() += 1;
    }

    AggregateTable::from_counts(
        counts
            .into_iter()
            .map(|(name, count)| (name.to_string(), count)),
    )
}

/// Submissions per author, all buckets. `[deleted]` is a single bucket.
pub fn author_counts(records: &[NormalizedRecord]) -> AggregateTable {
    count_by(records, |r| r.author_name.as_str())
}

/// The `n` authors with the most submissions.
pub fn top_authors(records: &[NormalizedRecord], n: usize) -> AggregateTable {
    author_counts(records).top(n)
}

/// Submissions per link domain, all buckets.
pub fn domain_counts(records: &[NormalizedRecord]) -> AggregateTable {
    count_by(records, |r| r.link_domain.as_str())
}

/// The `n` most linked domains.
pub fn top_domains(records: &[NormalizedRecord], n: usize) -> AggregateTable {
    domain_counts(records).top(n)
}

/// Lower-cased titles joined by spaces.
pub fn title_corpus(records: &[NormalizedRecord]) -> TextCorpus {
    let titles: Vec<String> = records.iter().map(|r| r.title.to_lowercase()).collect();
    TextCorpus::new(titles.join(" "))
}

/// Filtered comment bodies joined by spaces, case preserved.
pub fn comment_corpus(records: &[NormalizedRecord]) -> TextCorpus {
    let bodies: Vec<&str> = records
        .iter()
        .flat_map(|r| r.comment_bodies.iter().map(String::as_str))
        .collect();
    TextCorpus::new(bodies.join(" "))
}

/// Everything the renderers need, computed once.
#[derive(Debug, Clone)]
pub struct ReportData {
    pub submission_count: usize,
    pub account_ages: Vec<(YearMonth, usize)>,
    pub top_authors: AggregateTable,
    pub top_domains: AggregateTable,
    pub titles: TextCorpus,
    pub comments: TextCorpus,
}

impl ReportData {
    /// Run all aggregators over the normalized records.
    pub fn from_records(records: &[NormalizedRecord], top_n: usize) -> Self {
        Self {
            submission_count: records.len(),
            account_ages: account_age_histogram(records),
            top_authors: top_authors(records, top_n),
            top_domains: top_domains(records, top_n),
            titles: title_corpus(records),
            comments: comment_corpus(records),
        }
    }
}
