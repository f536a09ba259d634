// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Upstream collection API settings
    #[serde(default)]
    pub collection: CollectionConfig,

    /// Item page scraping behavior
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Outbound notification settings
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Periodic trigger intervals
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Storage locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Logging settings
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
        if self.collection.collection_id.trim().is_empty() {
            return Err(AppError::validation("collection.collection_id is empty"));
        }
        if self.collection.api_key.trim().is_empty() {
            return Err(AppError::validation("collection.api_key is empty"));
        }
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::validation("scraper.user_agent is empty"));
        }
        if self.scraper.timeout_secs == 0 {
            return Err(AppError::validation("scraper.timeout_secs must be > 0"));
        }
        if self.schedule.check_interval_secs == 0 {
            return Err(AppError::validation(
                "schedule.check_interval_secs must be > 0",
            ));
        }
        if self.schedule.refresh_interval_secs == 0 {
            return Err(AppError::validation(
                "schedule.refresh_interval_secs must be > 0",
            ));
        }
        Ok(())
    }
}

/// Upstream collection API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Steam Web API key
    #[serde(default)]
    pub api_key: String,

    /// Published file id of the watched collection
    #[serde(default)]
    pub collection_id: String,

    /// Collection details endpoint
    #[serde(default = "defaults::api_url")]
    pub api_url: String,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            collection_id: String::new(),
            api_url: defaults::api_url(),
        }
    }
}

/// Item page scraping behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-fetch timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between item fetches in seconds
    #[serde(default = "defaults::scrape_delay")]
    pub scrape_delay_secs: u64,

    /// Workshop item page base URL
    #[serde(default = "defaults::item_url")]
    pub item_url: String,
}

impl ScraperConfig {
    /// Full page URL for a workshop item.
    pub fn item_page_url(&self, id: &str) -> String {
        format!("{}?id={}", self.item_url, id)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            scrape_delay_secs: defaults::scrape_delay(),
            item_url: defaults::item_url(),
        }
    }
}

/// Outbound notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Discord webhook URL (empty disables delivery)
    #[serde(default)]
    pub webhook_url: String,

    /// Delay between outbound messages in milliseconds
    #[serde(default = "defaults::message_delay")]
    pub message_delay_ms: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            message_delay_ms: defaults::message_delay(),
        }
    }
}

/// Periodic trigger intervals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Incremental check interval in seconds
    #[serde(default = "defaults::check_interval")]
    pub check_interval_secs: u64,

    /// Full refresh interval in seconds
    #[serde(default = "defaults::refresh_interval")]
    pub refresh_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: defaults::check_interval(),
            refresh_interval_secs: defaults::refresh_interval(),
        }
    }
}

/// Storage locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the durable documents and audit log
    #[serde(default = "defaults::data_dir")]
    pub data_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace/debug/info/warn/error)
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

/// Default values for configuration fields.
mod defaults {
    pub fn api_url() -> String {
        "https://api.steampowered.com/ISteamRemoteStorage/GetCollectionDetails/v1/".to_string()
    }

    pub fn item_url() -> String {
        "https://steamcommunity.com/sharedfiles/filedetails/".to_string()
    }

    pub fn user_agent() -> String {
        "collection-watcher/0.1".to_string()
    }

    pub fn timeout() -> u64 {
        10
    }

    pub fn scrape_delay() -> u64 {
        7
    }

    pub fn message_delay() -> u64 {
        1000
    }

    pub fn check_interval() -> u64 {
        60
    }

    pub fn refresh_interval() -> u64 {
        6 * 60 * 60
    }

    pub fn data_dir() -> String {
        "data".to_string()
    }

    pub fn log_level() -> String {
        "info".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.collection.api_key = "key".to_string();
        config.collection.collection_id = "123456".to_string();
        config
    }

    #[test]
    fn test_defaults_fail_validation() {
        // No credentials in the defaults
        assert!(Config::default().validate().is_err());
    }

    #[test]
    fn test_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = valid_config();
        config.scraper.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml = r#"
            [collection]
            api_key = "key"
            collection_id = "123456"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.scraper.timeout_secs, 10);
        assert_eq!(config.scraper.scrape_delay_secs, 7);
        assert_eq!(config.notifier.message_delay_ms, 1000);
        assert_eq!(config.schedule.check_interval_secs, 60);
        assert_eq!(config.schedule.refresh_interval_secs, 21600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_item_page_url() {
        let config = ScraperConfig::default();
        assert_eq!(
            config.item_page_url("42"),
            "https://steamcommunity.com/sharedfiles/filedetails/?id=42"
        );
    }
}
