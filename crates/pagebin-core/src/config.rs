//! Configuration for the page store and admission control.
//!
//! Configuration is stored in TOML format and loaded from the platform
//! config directory, with environment variable overrides for tests and
//! containers:
//!
//! - `PAGEBIN_CONFIG` — path of the config file to load
//! - `PAGEBIN_DATA_DIR` — directory holding the database file, overriding
//!   whatever the config file says
//!
//! Every field has a default, so a missing config file is not an error.
//!
//! ## Example Configuration File
//!
//! ```toml
//! [store]
//! path = "/var/lib/pagebin/pagebin.db"
//! busy_timeout_ms = 30000
//!
//! [store.retry]
//! max_attempts = 3
//! initial_backoff_ms = 100
//!
//! [auth]
//! enabled = true
//! ```

use crate::db::{RetrySettings, StoreSettings};
use crate::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DB_FILE_NAME: &str = "pagebin.db";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Store location and contention policy.
    #[serde(default)]
    pub store: StoreConfig,
    /// Admission-control switches.
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Store location and contention policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the SQLite database file. The parent directory is created on
    /// first open.
    #[serde(default = "StoreConfig::default_path")]
    pub path: PathBuf,
    /// Store-level wait on a locked database before contention is reported.
    #[serde(default = "StoreConfig::default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Application-level retry policy on top of the busy wait.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl StoreConfig {
    fn default_path() -> PathBuf {
        if let Ok(dir) = std::env::var("PAGEBIN_DATA_DIR") {
            let trimmed = dir.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed).join(DB_FILE_NAME);
            }
        }

        ProjectDirs::from("dev", "pagebin", "pagebin").map_or_else(
            || PathBuf::from("data").join(DB_FILE_NAME),
            |dirs| dirs.data_dir().join(DB_FILE_NAME),
        )
    }

    const fn default_busy_timeout_ms() -> u64 {
        30_000
    }

    /// Open-time settings for [`crate::Db::open`].
    #[must_use]
    pub fn settings(&self) -> StoreSettings {
        StoreSettings {
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
            retry: self.retry.settings(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            busy_timeout_ms: Self::default_busy_timeout_ms(),
            retry: RetryConfig::default(),
        }
    }
}

/// Retry policy knobs, in config-file-friendly units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts per store operation, including the first.
    #[serde(default = "RetryConfig::default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff before the second attempt, doubling afterwards.
    #[serde(default = "RetryConfig::default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
}

impl RetryConfig {
    const fn default_max_attempts() -> u32 {
        3
    }

    const fn default_initial_backoff_ms() -> u64 {
        100
    }

    fn settings(self) -> RetrySettings {
        RetrySettings {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: Self::default_max_attempts(),
            initial_backoff_ms: Self::default_initial_backoff_ms(),
        }
    }
}

/// Admission-control switches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Master switch; with enforcement off every guard admits everyone.
    #[serde(default = "AuthConfig::default_enabled")]
    pub enabled: bool,
}

impl AuthConfig {
    const fn default_enabled() -> bool {
        true
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
        }
    }
}

impl Config {
    /// Load configuration from the default location or create with
    /// defaults.
    ///
    /// Resolution order: `PAGEBIN_CONFIG` if set, else the platform config
    /// directory. A missing file yields defaults; a malformed file is an
    /// error. `PAGEBIN_DATA_DIR` overrides the database location either
    /// way.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };

        if let Ok(dir) = std::env::var("PAGEBIN_DATA_DIR") {
            let trimmed = dir.trim();
            if !trimmed.is_empty() {
                config.store.path = PathBuf::from(trimmed).join(DB_FILE_NAME);
            }
        }

        Ok(config)
    }

    /// Load configuration from an explicit file path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config {}: {e}", path.display())))
    }

    /// Save the configuration, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("failed to create config dir: {e}")))?;
        }
        let toml = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))?;
        fs::write(path, toml)
            .map_err(|e| Error::Config(format!("failed to write config: {e}")))?;
        Ok(())
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("PAGEBIN_CONFIG") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }

        ProjectDirs::from("dev", "pagebin", "pagebin")
            .map(|dirs| dirs.config_dir().join("pagebin.toml"))
    }
}
