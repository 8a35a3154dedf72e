//! Configuration management for genealogy-snippets.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "genealogy-snippets";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "snippets.db";

/// Slot name the catalog is stored under.
pub const DEFAULT_CATALOG_KEY: &str = "list";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `GENSNIP_`, `__` between sections)
/// 2. TOML config file at `~/.config/genealogy-snippets/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Change watching configuration.
    pub watch: WatchConfig,
    /// Native-messaging bridge configuration.
    pub bridge: BridgeConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/genealogy-snippets/snippets.db`
    pub database_path: Option<PathBuf>,
    /// Name of the slot holding the catalog.
    pub catalog_key: String,
}

/// Store watcher configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Interval between fingerprint polls in milliseconds.
    pub poll_interval_ms: u64,
    /// Capacity of the change feed before slow subscribers lag.
    pub feed_capacity: usize,
}

/// Native-messaging bridge configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Largest incoming frame accepted, in bytes.
    pub max_message_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            catalog_key: DEFAULT_CATALOG_KEY.to_string(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            feed_capacity: 16,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            // Browsers cap extension-to-host messages at 64 MiB.
            max_message_bytes: 64 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("GENSNIP_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.catalog_key.trim().is_empty() {
            return Err(Error::config_validation("catalog_key must not be empty"));
        }

        if self.watch.poll_interval_ms == 0 {
            return Err(Error::config_validation(
                "poll_interval_ms must be greater than 0",
            ));
        }

        if self.watch.feed_capacity == 0 {
            return Err(Error::config_validation(
                "feed_capacity must be greater than 0",
            ));
        }

        if self.bridge.max_message_bytes == 0 {
            return Err(Error::config_validation(
                "max_message_bytes must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the catalog slot name.
    #[must_use]
    pub fn catalog_key(&self) -> &str {
        &self.storage.catalog_key
    }

    /// Get the watcher poll interval as a Duration.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.watch.poll_interval_ms)
    }
}
