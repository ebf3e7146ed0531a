//! Submission normalization.
//!
//! Reduces forum submissions to the fields the report needs. Author and
//! URL problems degrade to sentinel values instead of failing.

use crate::models::{AuthorLookup, NormalizedRecord, Submission, DELETED_AUTHOR};
use chrono::{DateTime, Utc};
use tracing::debug;
use url::Url;

/// Normalize every submission, preserving order.
pub fn normalize(submissions: &[Submission], comment_score_threshold: i64) -> Vec<NormalizedRecord> {
    submissions
        .iter()
        .map(|submission| normalize_submission(submission, comment_score_threshold))
        .collect()
}

/// Normalize a single submission.
pub fn normalize_submission(
    submission: &Submission,
    comment_score_threshold: i64,
) -> NormalizedRecord {
    let (author_name, author_created_at) = author_fields(&submission.author);

    NormalizedRecord {
        author_name,
        author_created_at,
        title: submission.title.clone(),
        link_domain: link_domain(&submission.url),
        comment_bodies: submission
            .comments
            .iter()
            .filter(|comment| comment.score > comment_score_threshold)
            .map(|comment| comment.body.clone())
            .collect(),
    }
}

/// Name and creation time for an author lookup, with the deleted sentinel.
fn author_fields(author: &AuthorLookup) -> (String, Option<DateTime<Utc>>) {
    match author {
        AuthorLookup::Resolved(author) => (author.name.clone(), author.created_at),
        AuthorLookup::Deleted => (DELETED_AUTHOR.to_string(), None),
        AuthorLookup::Unavailable(reason) => {
            debug!("Treating unresolved author as deleted: {}", reason);
            (DELETED_AUTHOR.to_string(), None)
        }
    }
}

/// Network location (`host[:port]`) of a URL; empty when it cannot be parsed.
///
/// The host is lower-cased. A port written in the URL is kept even when it
/// is the scheme's default.
pub fn link_domain(raw: &str) -> String {
    let raw = raw.trim();
    let Ok(url) = Url::parse(raw) else {
        return String::new();
    };
    let Some(host) = url.host_str() else {
        return String::new();
    };

    match url.port().or_else(|| written_port(raw)) {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// Port as written in the authority; the parsed URL drops default ports.
fn written_port(raw: &str) -> Option<u16> {
    let (_, rest) = raw.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host_port = authority.rsplit('@').next()?;
    let (_, port) = host_port.rsplit_once(':')?;
    port.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Author, Comment};
    use chrono::TimeZone;

    fn submission(author: AuthorLookup, url: &str, comments: Vec<Comment>) -> Submission {
        Submission {
            id: "id".to_string(),
            score: 1,
            title: "Some Title".to_string(),
            url: url.to_string(),
            author,
            comments,
        }
    }

    #[test]
    fn test_link_domain_keeps_host_and_port() {
        assert_eq!(link_domain("http://example.com/x"), "example.com");
        assert_eq!(link_domain("https://i.imgur.com/a.png?x=1"), "i.imgur.com");
        assert_eq!(link_domain("http://localhost:8080/path"), "localhost:8080");
        assert_eq!(link_domain("https://user:pw@example.org/"), "example.org");
    }

    #[test]
    fn test_link_domain_keeps_default_ports_written_in_url() {
        assert_eq!(link_domain("http://example.com:80/x"), "example.com:80");
        assert_eq!(link_domain("https://example.com:443"), "example.com:443");
        assert_eq!(link_domain("https://bob@example.com:443/a"), "example.com:443");
        assert_eq!(link_domain("http://[::1]:80/"), "[::1]:80");
        assert_eq!(link_domain("http://[::1]/"), "[::1]");
        assert_eq!(link_domain("http://example.com/a:80"), "example.com");
    }

    #[test]
    fn test_link_domain_lowercases_host() {
        assert_eq!(link_domain("http://Example.COM/x"), "example.com");
    }

    #[test]
    fn test_link_domain_malformed_is_empty() {
        assert_eq!(link_domain("not a url"), "");
        assert_eq!(link_domain("example.com/no-scheme"), "");
        assert_eq!(link_domain(""), "");
        assert_eq!(link_domain("mailto:someone@example.com"), "");
    }

    #[test]
    fn test_link_domain_is_pure() {
        let url = "https://other.org/z";
        assert_eq!(link_domain(url), link_domain(url));
        assert_eq!(link_domain("::"), link_domain("::"));
    }

    #[test]
    fn test_resolved_author() {
        let created = Utc.timestamp_opt(1_500_000_000, 0).unwrap();
        let record = normalize_submission(
            &submission(
                AuthorLookup::Resolved(Author {
                    name: "alice".to_string(),
                    created_at: Some(created),
                }),
                "https://example.com",
                vec![],
            ),
            10,
        );
        assert_eq!(record.author_name, "alice");
        assert_eq!(record.author_created_at, Some(created));
        assert_eq!(record.title, "Some Title");
        assert_eq!(record.link_domain, "example.com");
    }

    #[test]
    fn test_deleted_and_unavailable_authors_degrade_to_sentinel() {
        for author in [
            AuthorLookup::Deleted,
            AuthorLookup::Unavailable("404 Not Found".to_string()),
        ] {
            let record = normalize_submission(&submission(author, "x", vec![]), 10);
            assert_eq!(record.author_name, DELETED_AUTHOR);
            assert!(record.author_created_at.is_none());
        }
    }

    #[test]
    fn test_comment_threshold_is_strict() {
        let comments = vec![
            Comment {
                body: "eleven".to_string(),
                score: 11,
            },
            Comment {
                body: "ten".to_string(),
                score: 10,
            },
            Comment {
                body: "negative".to_string(),
                score: -3,
            },
        ];
        let record =
            normalize_submission(&submission(AuthorLookup::Deleted, "x", comments), 10);
        assert_eq!(record.comment_bodies, vec!["eleven".to_string()]);
    }

    #[test]
    fn test_normalize_preserves_order() {
        let submissions = vec![
            submission(AuthorLookup::Deleted, "https://a.com", vec![]),
            submission(AuthorLookup::Deleted, "https://b.com", vec![]),
        ];
        let records = normalize(&submissions, 10);
        let domains: Vec<&str> = records.iter().map(|r| r.link_domain.as_str()).collect();
        assert_eq!(domains, vec!["a.com", "b.com"]);
    }
}
