//! File-backed snapshot store
//!
//! Keeps the ledger snapshot and the routing rules as JSON files in the
//! data directory. Writes go through a temporary file and a rename.

use anyhow::{Context, Result};
use modelgate_llm::RuleSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Ledger snapshot file name
pub const LEDGER_FILE: &str = "ledger.json";
/// Routing rules file name
pub const RULES_FILE: &str = "rules.json";

/// Snapshot files under one directory
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Create a store rooted at `dir`. Nothing is touched until a write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Data directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the ledger snapshot
    #[must_use]
    pub fn ledger_path(&self) -> PathBuf {
        self.dir.join(LEDGER_FILE)
    }

    /// Path of the rules file
    #[must_use]
    pub fn rules_path(&self) -> PathBuf {
        self.dir.join(RULES_FILE)
    }

    /// Raw ledger snapshot JSON, if one was saved
    pub fn load_ledger(&self) -> Result<Option<String>> {
        read_optional(&self.ledger_path())
    }

    /// Save ledger snapshot JSON
    pub fn save_ledger(&self, json: &str) -> Result<()> {
        write_atomic(&self.ledger_path(), json)
    }

    /// Saved routing rules, if any
    pub fn load_rules(&self) -> Result<Option<RuleSet>> {
        let path = self.rules_path();
        match read_optional(&path)? {
            Some(json) => {
                let rules = serde_json::from_str(&json)
                    .with_context(|| format!("Failed to parse {}", path.display()))?;
                Ok(Some(rules))
            }
            None => Ok(None),
        }
    }

    /// Save routing rules
    pub fn save_rules(&self, rules: &RuleSet) -> Result<()> {
        let json = serde_json::to_string_pretty(rules).context("Failed to serialize rules")?;
        write_atomic(&self.rules_path(), &json)
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
