//! Application configuration structures.

use std::fs;
use std::path::Path;

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Announcement feed location and matching rules
    #[serde(default)]
    pub feed: FeedConfig,

    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Static hosting target for the table
    #[serde(default)]
    pub publish: PublishConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        url::Url::parse(&self.feed.list_url)
            .map_err(|e| AppError::validation(format!("feed.list_url: {e}")))?;
        url::Url::parse(&self.feed.base_url)
            .map_err(|e| AppError::validation(format!("feed.base_url: {e}")))?;
        url::Url::parse(&self.publish.api_base)
            .map_err(|e| AppError::validation(format!("publish.api_base: {e}")))?;
        if self.feed.category_code.trim().is_empty() {
            return Err(AppError::validation("feed.category_code is empty"));
        }
        if !self.publish.file_path.starts_with('/') {
            return Err(AppError::validation("publish.file_path must start with '/'"));
        }
        Selector::parse(&self.feed.content_selector)
            .map_err(|e| AppError::selector(&self.feed.content_selector, format!("{e:?}")))?;
        Ok(())
    }
}

/// Where announcements come from and which ones count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// JSON list resource
    #[serde(default = "defaults::list_url")]
    pub list_url: String,

    /// Base that item links are resolved against
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Category code of ranked-battle announcements
    #[serde(default = "defaults::category_code")]
    pub category_code: String,

    /// Category label of ranked-battle announcements
    #[serde(default = "defaults::category_label")]
    pub category_label: String,

    /// CSS selector of the detail page's content region
    #[serde(default = "defaults::content_selector")]
    pub content_selector: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            list_url: defaults::list_url(),
            base_url: defaults::base_url(),
            category_code: defaults::category_code(),
            category_label: defaults::category_label(),
            content_selector: defaults::content_selector(),
        }
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Pause between detail page requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
        }
    }
}

/// Hosting service settings. Credentials are read from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// Path the table is published under
    #[serde(default = "defaults::file_path")]
    pub file_path: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::api_base(),
            file_path: defaults::file_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::level(),
        }
    }
}

mod defaults {
    // Feed defaults
    pub fn list_url() -> String {
        "https://sv-news.pokemon.co.jp/ja/json/list.json".into()
    }
    pub fn base_url() -> String {
        "https://sv-news.pokemon.co.jp/ja/".into()
    }
    pub fn category_code() -> String {
        "2".into()
    }
    pub fn category_label() -> String {
        "ランクバトル".into()
    }
    pub fn content_selector() -> String {
        "div.body".into()
    }

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; rankbattle-crawler/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        1000
    }

    // Publish defaults
    pub fn api_base() -> String {
        "https://api.netlify.com/api/v1".into()
    }
    pub fn file_path() -> String {
        "/season_regulation.json".into()
    }

    pub fn level() -> String {
        "info".into()
    }
}
