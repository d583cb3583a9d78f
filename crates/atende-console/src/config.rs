use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use atende::types::{FeedMode, SyncConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub sync: SyncSection,
    #[serde(default)]
    pub store: StoreConfig,
    pub logging: LoggingConfig,

    // Secret (from ENV only)
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncSection {
    pub message_poll_ms: u64,
    pub thread_poll_ms: u64,
    pub reconcile_window_ms: u64,
    #[serde(default)]
    pub feed: FeedMode,
}

impl From<&SyncSection> for SyncConfig {
    fn from(section: &SyncSection) -> Self {
        SyncConfig::new()
            .with_message_poll_interval(Duration::from_millis(section.message_poll_ms))
            .with_thread_poll_interval(Duration::from_millis(section.thread_poll_ms))
            .with_reconcile_window(Duration::from_millis(section.reconcile_window_ms))
            .with_feed(section.feed)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables, e.g. `ATENDE_API__BASE_URL`
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("ATENDE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Token is a secret: never from TOML
        cfg.token = std::env::var("ATENDE_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));
        builder.build()?.try_deserialize()
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig::from(&self.sync)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.api.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [api]
        base_url = "https://api.loja.com"
        timeout_ms = 5000

        [sync]
        message_poll_ms = 1000
        thread_poll_ms = 10000
        reconcile_window_ms = 4000
        feed = "push"

        [logging]
        level = "debug"
        format = "json"
    "#;

    #[test]
    fn test_config_structure() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.api.base_url, "https://api.loja.com");
        assert!(config.store.path.is_none());
        assert!(config.token.is_none());

        let sync = config.sync_config();
        assert_eq!(sync.message_poll_interval, Duration::from_millis(1000));
        assert_eq!(sync.reconcile_window_ms(), 4000);
        assert_eq!(sync.feed, FeedMode::Push);
    }

    #[test]
    fn test_feed_defaults_to_poll() {
        let without_feed = SAMPLE.replace("feed = \"push\"", "");
        let config: Config = toml::from_str(&without_feed).unwrap();
        assert_eq!(config.sync.feed, FeedMode::Poll);
    }
}
