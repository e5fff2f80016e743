use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

pub const DEFAULT_LISTING_URL: &str = "https://titck.gov.tr/duyuru?page=1";
pub const DEFAULT_USER_AGENT: &str = concat!("duyuru-feed/", env!("CARGO_PKG_VERSION"));

/// Everything a run needs. Passed explicitly into the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listing_url: String,
    pub output: PathBuf,
    /// Extractor profile used for the listing and detail pages.
    pub profile: String,
    pub max_items: usize,
    pub request_timeout_secs: u64,
    /// Wall-clock budget for the whole run.
    pub run_budget_secs: u64,
    pub concurrency: usize,
    pub retries: u32,
    pub retry_backoff_ms: u64,
    pub user_agent: String,
    /// Offset applied to page dates that carry no zone of their own.
    pub utc_offset_minutes: i32,
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub title: String,
    pub description: String,
    /// Channel link; the listing URL when unset.
    pub link: Option<String>,
    pub language: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            output: PathBuf::from("feed.xml"),
            profile: "titck".to_string(),
            max_items: 30,
            request_timeout_secs: 15,
            run_budget_secs: 300,
            concurrency: 4,
            retries: 2,
            retry_backoff_ms: 500,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            utc_offset_minutes: 180,
            feed: FeedConfig::default(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            title: "TİTCK Duyurular".to_string(),
            description: "T.C. Türkiye İlaç ve Tıbbi Cihaz Kurumu duyuruları".to_string(),
            link: None,
            language: Some("tr".to_string()),
        }
    }
}

impl Config {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.listing_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "listing URL must be http(s): {}",
                self.listing_url
            )));
        }
        if self.concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config("request timeout must be positive".to_string()));
        }
        if self.run_budget_secs == 0 {
            return Err(Error::Config("run budget must be positive".to_string()));
        }
        self.utc_offset()?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn run_budget(&self) -> Duration {
        Duration::from_secs(self.run_budget_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn utc_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            Error::Config(format!("invalid UTC offset: {} minutes", self.utc_offset_minutes))
        })
    }

    pub fn channel_link(&self) -> &str {
        self.feed.link.as_deref().unwrap_or(&self.listing_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.output, PathBuf::from("feed.xml"));
        assert_eq!(config.max_items, 30);
        assert_eq!(config.channel_link(), DEFAULT_LISTING_URL);
        assert_eq!(config.utc_offset().unwrap().local_minus_utc(), 3 * 3600);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.concurrency = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.listing_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidUrl(_))));

        let mut config = Config::default();
        config.listing_url = "ftp://example.com/list".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.utc_offset_minutes = 48 * 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"listing_url": "https://example.com/list", "max_items": 5, "feed": {"title": "Example"}}"#,
        )
        .unwrap();
        assert_eq!(config.listing_url, "https://example.com/list");
        assert_eq!(config.max_items, 5);
        assert_eq!(config.feed.title, "Example");
        assert_eq!(config.feed.language.as_deref(), Some("tr"));
        assert_eq!(config.concurrency, 4);
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = Config::from_json_file(Path::new("/nonexistent/duyuru-feed.json")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
