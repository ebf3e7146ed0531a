//! Wire types for the Reddit JSON API.
//!
//! Listings wrap their children in `{kind, data}` envelopes. Children are
//! kept as raw JSON and decoded by kind, since a single listing mixes
//! comments with "more" placeholders.

use crate::models::Comment;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

pub const KIND_COMMENT: &str = "t1";
pub const KIND_ACCOUNT: &str = "t2";
pub const KIND_LINK: &str = "t3";
pub const KIND_MORE: &str = "more";

/// Response of the OAuth2 token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A `{kind, data}` envelope with undecoded payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Thing {
    pub kind: String,
    pub data: Value,
}

/// A paginated listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub children: Vec<Thing>,
}

/// Submission payload (`t3`).
#[derive(Debug, Clone, Deserialize)]
pub struct LinkData {
    pub id: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub author: Option<String>,
}

/// Comment payload (`t1`).
#[derive(Debug, Clone, Deserialize)]
pub struct CommentData {
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub parent_id: String,
}

impl From<CommentData> for Comment {
    fn from(data: CommentData) -> Self {
        Comment {
            body: data.body,
            score: data.score,
        }
    }
}

/// "Load more comments" placeholder.
#[derive(Debug, Clone, Deserialize)]
pub struct MoreData {
    #[serde(default)]
    pub parent_id: String,
    #[serde(default)]
    pub children: Vec<String>,
}

/// Account payload (`t2`) from `/user/{name}/about`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountData {
    pub name: String,
    #[serde(default)]
    pub created_utc: Option<f64>,
}

impl AccountData {
    /// Creation time, if the account exposes one.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let secs = self.created_utc?;
        Utc.timestamp_opt(secs.trunc() as i64, 0).single()
    }
}

/// Response of `/api/morechildren?api_type=json`.
#[derive(Debug, Clone, Deserialize)]
pub struct MoreChildrenResponse {
    pub json: MoreChildrenJson,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoreChildrenJson {
    #[serde(default)]
    pub errors: Vec<Value>,
    #[serde(default)]
    pub data: Option<MoreChildrenData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoreChildrenData {
    #[serde(default)]
    pub things: Vec<Thing>,
}

/// Comment-tree node after decoding by kind.
#[derive(Debug, Clone)]
pub enum CommentNode {
    Comment(CommentData),
    More(MoreData),
}

impl Thing {
    /// Decode a comment-tree child; unrelated kinds yield `None`.
    pub fn into_comment_node(self) -> Result<Option<CommentNode>, serde_json::Error> {
        match self.kind.as_str() {
            KIND_COMMENT => Ok(Some(CommentNode::Comment(serde_json::from_value(
                self.data,
            )?))),
            KIND_MORE => Ok(Some(CommentNode::More(serde_json::from_value(self.data)?))),
            _ => Ok(None),
        }
    }
}
