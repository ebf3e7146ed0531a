//! Forum access.
//!
//! The report pipeline only depends on the [`ForumClient`] capability;
//! [`RedditClient`] is the production implementation.

pub mod client;
pub mod error;
pub mod types;

pub use client::RedditClient;
pub use error::{ForumError, Result};

use crate::models::{Submission, Timeframe};

/// Source of top submissions for a subreddit.
#[allow(async_fn_in_trait)]
pub trait ForumClient {
    /// Top submissions of `subreddit` in `timeframe`, highest score first.
    async fn fetch_top(&self, subreddit: &str, timeframe: Timeframe) -> Result<Vec<Submission>>;
}
