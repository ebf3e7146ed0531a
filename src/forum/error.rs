//! Errors raised while talking to the forum API.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ForumError>;

#[derive(Debug, Error)]
pub enum ForumError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}) for {endpoint}: {message}")]
    Api {
        status: u16,
        endpoint: String,
        message: String,
    },

    #[error("Request rejected by {endpoint}: {message}")]
    Rejected { endpoint: String, message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Subreddit not found or inaccessible: r/{0}")]
    SubredditUnavailable(String),
}

impl From<reqwest::Error> for ForumError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ForumError::Parse(err.to_string())
        } else {
            ForumError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ForumError {
    fn from(err: serde_json::Error) -> Self {
        ForumError::Parse(err.to_string())
    }
}
