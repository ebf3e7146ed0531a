//! Configuration file handling.
//!
//! This module loads the `reddit-trust.toml` file holding the API
//! credentials together with optional API and report settings.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "reddit-trust.toml";

/// Environment variable overriding the configuration file path.
pub const CONFIG_PATH_ENV: &str = "REDDIT_TRUST_CONFIG";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API credentials. Required.
    pub bot: Credentials,

    /// API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Script-app credentials registered with the forum.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Forum API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// OAuth2 token endpoint.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Base URL for authenticated API calls.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Submissions requested per listing page (max 100).
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Upper bound on submissions collected per run.
    #[serde(default = "default_listing_limit")]
    pub listing_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            auth_url: default_auth_url(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            page_size: default_page_size(),
            listing_limit: default_listing_limit(),
        }
    }
}

fn default_user_agent() -> String {
    "Reddit Trust Data Analyzer".to_string()
}

fn default_auth_url() -> String {
    "https://www.reddit.com/api/v1/access_token".to_string()
}

fn default_base_url() -> String {
    "https://oauth.reddit.com".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_page_size() -> u32 {
    100
}

fn default_listing_limit() -> usize {
    1000 // listings stop paginating around here anyway
}

/// What to do when a chart or word cloud has nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyInputPolicy {
    /// Fail the run; no report is written.
    #[default]
    Abort,
    /// Render the page with a "No data available" notice.
    Placeholder,
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Number of buckets shown in bar charts.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Comments must score strictly above this to enter the corpus.
    #[serde(default = "default_comment_threshold")]
    pub comment_score_threshold: i64,

    /// Behaviour for empty tables and corpora.
    #[serde(default)]
    pub on_empty: EmptyInputPolicy,

    /// Directory the PDF is written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Subreddit used when none is given on the command line.
    #[serde(default)]
    pub default_subreddit: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            comment_score_threshold: default_comment_threshold(),
            on_empty: EmptyInputPolicy::default(),
            output_dir: default_output_dir(),
            default_subreddit: None,
        }
    }
}

fn default_top_n() -> usize {
    10
}

fn default_comment_threshold() -> i64 {
    10
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the configuration path from the environment or the default.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Reject configurations that would only fail later against the API.
    pub fn validate(&self) -> Result<()> {
        if self.bot.client_id.trim().is_empty() {
            bail!("[bot] client_id must not be empty");
        }
        if self.bot.client_secret.trim().is_empty() {
            bail!("[bot] client_secret must not be empty");
        }
        if self.api.timeout_seconds == 0 {
            bail!("[api] timeout_seconds must be at least 1");
        }
        if !(1..=100).contains(&self.api.page_size) {
            bail!("[api] page_size must be between 1 and 100");
        }
        if self.report.top_n == 0 {
            bail!("[report] top_n must be at least 1");
        }
        Ok(())
    }
}
