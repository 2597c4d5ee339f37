//! Application wiring
//!
//! Builds one explicitly owned router from configuration and the snapshot
//! store, and writes state back after mutating commands.
//!
//! # Module Structure
//!
//! - `config`: AppConfig and retention settings
//! - `loader`: Layered configuration loading
//! - `store`: ledger.json / rules.json persistence

pub mod config;
pub mod loader;
pub mod store;

use anyhow::{Context, Result};
use modelgate_llm::{ModelRouter, RouterConfigUpdate};
use std::path::Path;
use tracing::debug;

pub use config::AppConfig;
pub use store::SnapshotStore;

/// Loaded configuration, store, and router
pub struct App {
    /// Effective configuration
    pub config: AppConfig,
    /// Snapshot files
    pub store: SnapshotStore,
    /// Routing engine
    pub router: ModelRouter,
}

impl App {
    /// Load configuration, then restore rules and ledger from the store
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        Self::new(loader::load_config(config_path)?)
    }

    /// Build from an already loaded configuration
    pub fn new(config: AppConfig) -> Result<Self> {
        let store = SnapshotStore::new(config.data_dir());
        let router =
            ModelRouter::new(config.router.clone()).context("Invalid router configuration")?;

        let app = Self {
            config,
            store,
            router,
        };

        if let Some(rules) = app.store.load_rules()? {
            app.router
                .update_config(RouterConfigUpdate {
                    rules: Some(rules),
                    ..Default::default()
                })
                .with_context(|| {
                    format!("Invalid rules in {}", app.store.rules_path().display())
                })?;
        }
        app.reload_ledger()?;

        debug!(data_dir = %app.store.dir().display(), "Application state loaded");
        Ok(app)
    }

    /// Replace in-memory ledger state with the saved snapshot, if any
    pub fn reload_ledger(&self) -> Result<()> {
        if let Some(json) = self.store.load_ledger()? {
            self.router.import_snapshot(&json).with_context(|| {
                format!("Invalid ledger snapshot {}", self.store.ledger_path().display())
            })?;
        }
        Ok(())
    }

    /// Prune expired records from the saved ledger.
    ///
    /// Reloads from disk first so records written by other processes survive,
    /// and saves only when something was removed.
    pub fn sweep_expired(&self) -> Result<usize> {
        self.reload_ledger()?;
        let removed = self.router.ledger().prune_expired();
        if removed > 0 {
            self.save()?;
        }
        Ok(removed)
    }

    /// Persist ledger snapshot and rules
    pub fn save(&self) -> Result<()> {
        let snapshot = self
            .router
            .export_snapshot()
            .context("Failed to export ledger")?;
        self.store.save_ledger(&snapshot)?;
        self.store.save_rules(&self.router.config().rules)?;
        debug!(data_dir = %self.store.dir().display(), "State saved");
        Ok(())
    }
}
