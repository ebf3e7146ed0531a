//! Command-line interface argument parsing.
//!
//! This module handles CLI argument parsing using clap and the
//! resolution of the subreddit to analyze.

use crate::models::Timeframe;
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::{BufRead, IsTerminal, Write};

/// Reddit Trust - analyze a subreddit's most popular authors, submission
/// titles and comments.
///
/// Writes a PDF report named after the current time (YYYYMMDD_HHMMSS.pdf).
/// Credentials are read from reddit-trust.toml or the file named by
/// REDDIT_TRUST_CONFIG.
///
/// Examples:
///   reddit-trust rust
///   reddit-trust rust year
///   reddit-trust r/AskHistorians all
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Subreddit name
    ///
    /// Falls back to `default_subreddit` from the config file, then to an
    /// interactive prompt.
    pub subreddit: Option<String>,

    /// The timeframe of top posts that are analyzed. Defaults to the last day
    #[arg(value_enum, default_value_t = Timeframe::Day)]
    pub timeframe: Timeframe,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref name) = self.subreddit {
            normalize_subreddit(name)?;
        }
        Ok(())
    }
}

/// Strip `r/` prefixes and check the name against the forum's naming rules.
pub fn normalize_subreddit(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    let name = trimmed
        .strip_prefix("/r/")
        .or_else(|| trimmed.strip_prefix("r/"))
        .unwrap_or(trimmed)
        .trim_end_matches('/');

    if name.is_empty() {
        return Err("Subreddit name must not be empty".to_string());
    }
    if !(2..=21).contains(&name.len()) {
        return Err(format!(
            "Subreddit name must be 2-21 characters long: {}",
            name
        ));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!(
            "Subreddit name may only contain letters, digits and underscores: {}",
            name
        ));
    }

    Ok(name.to_string())
}

/// Pick the subreddit from the arguments, the config default, or stdin.
pub fn resolve_subreddit(args: &Args, configured: Option<&str>) -> Result<String> {
    if let Some(ref name) = args.subreddit {
        return normalize_subreddit(name).map_err(anyhow::Error::msg);
    }
    if let Some(name) = configured {
        return normalize_subreddit(name)
            .map_err(anyhow::Error::msg)
            .context("Invalid default_subreddit in config");
    }

    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        bail!("No subreddit given and no default_subreddit configured");
    }

    print!("Subreddit name: ");
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    stdin
        .lock()
        .read_line(&mut line)
        .context("Failed to read subreddit name")?;

    normalize_subreddit(&line).map_err(anyhow::Error::msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args(subreddit: Option<&str>) -> Args {
        Args {
            subreddit: subreddit.map(String::from),
            timeframe: Timeframe::Day,
        }
    }

    #[test]
    fn test_positional_arguments() {
        let args = Args::try_parse_from(["reddit-trust", "rust", "year"]).unwrap();
        assert_eq!(args.subreddit.as_deref(), Some("rust"));
        assert_eq!(args.timeframe, Timeframe::Year);
    }

    #[test]
    fn test_timeframe_defaults_to_day() {
        let args = Args::try_parse_from(["reddit-trust", "rust"]).unwrap();
        assert_eq!(args.timeframe, Timeframe::Day);

        let args = Args::try_parse_from(["reddit-trust"]).unwrap();
        assert!(args.subreddit.is_none());
    }

    #[test]
    fn test_invalid_timeframe_fails_fast() {
        assert!(Args::try_parse_from(["reddit-trust", "rust", "week"]).is_err());
        assert!(Args::try_parse_from(["reddit-trust", "rust", "decade"]).is_err());
    }

    #[test]
    fn test_normalize_subreddit_prefixes() {
        assert_eq!(normalize_subreddit("rust").unwrap(), "rust");
        assert_eq!(normalize_subreddit("r/rust").unwrap(), "rust");
        assert_eq!(normalize_subreddit("/r/rust/").unwrap(), "rust");
        assert_eq!(normalize_subreddit("  Ask_Science\n").unwrap(), "Ask_Science");
    }

    #[test]
    fn test_normalize_subreddit_rejects_bad_names() {
        assert!(normalize_subreddit("").is_err());
        assert!(normalize_subreddit("r/").is_err());
        assert!(normalize_subreddit("a").is_err());
        assert!(normalize_subreddit("has space").is_err());
        assert!(normalize_subreddit("dots.not.allowed").is_err());
        assert!(normalize_subreddit(&"x".repeat(22)).is_err());
    }

    #[test]
    fn test_validation() {
        assert!(make_args(Some("rust")).validate().is_ok());
        assert!(make_args(None).validate().is_ok());
        assert!(make_args(Some("bad name")).validate().is_err());
    }

    #[test]
    fn test_resolve_prefers_argument_over_config() {
        let args = make_args(Some("rust"));
        assert_eq!(resolve_subreddit(&args, Some("golang")).unwrap(), "rust");

        let args = make_args(None);
        assert_eq!(resolve_subreddit(&args, Some("r/golang")).unwrap(), "golang");
    }
}
