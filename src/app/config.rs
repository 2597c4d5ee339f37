//! Application configuration types

use modelgate_llm::RouterConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding ledger.json and rules.json
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Routing engine configuration
    #[serde(default)]
    pub router: RouterConfig,
    /// Background retention settings
    #[serde(default)]
    pub retention: RetentionConfig,
}

impl AppConfig {
    /// Configured data directory, or the platform default
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}

/// Platform data directory joined with `modelgate`
#[must_use]
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("modelgate")
}

fn default_interval_secs() -> u64 {
    3600
}

/// Retention sweep settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Seconds between prune sweeps
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl RetentionConfig {
    /// Sweep interval, at least one second
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}
