//! Ledger snapshots
//!
//! The JSON document exchanged with the persistence layer:
//!
//! ```json
//! {
//!   "records": [{ "id": "...", "timestamp": "2026-01-01T00:00:00Z", "model": "...",
//!                 "inputTokens": 1, "outputTokens": 1, "cost": 0.1, "taskType": "..." }],
//!   "budgetLimit": 5.0,
//!   "budgetPeriod": "day"
//! }
//! ```

use super::period::{BudgetConfig, BudgetPeriod};
use super::record::UsageRecord;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Full export of ledger state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    /// Every retained usage record
    pub records: Vec<UsageRecord>,
    /// Budget ceiling (USD)
    pub budget_limit: f64,
    /// Budget period
    pub budget_period: BudgetPeriod,
}

impl LedgerSnapshot {
    /// Parse and validate a snapshot document
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidSnapshot(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Budget carried by this snapshot
    #[must_use]
    pub fn budget(&self) -> BudgetConfig {
        BudgetConfig {
            limit: self.budget_limit,
            period: self.budget_period,
        }
    }

    /// Reject snapshots that would put the ledger in an invalid state
    pub fn validate(&self) -> Result<()> {
        self.budget()
            .validate()
            .map_err(|e| Error::InvalidSnapshot(e.to_string()))?;

        let mut ids = HashSet::with_capacity(self.records.len());
        for (index, record) in self.records.iter().enumerate() {
            if record.id.trim().is_empty() {
                return Err(Error::InvalidSnapshot(format!("record {index} has an empty id")));
            }
            if record.model.trim().is_empty() {
                return Err(Error::InvalidSnapshot(format!(
                    "record {} has an empty model",
                    record.id
                )));
            }
            if !record.cost.is_finite() || record.cost < 0.0 {
                return Err(Error::InvalidSnapshot(format!(
                    "record {} has invalid cost {}",
                    record.id, record.cost
                )));
            }
            if !ids.insert(record.id.as_str()) {
                return Err(Error::InvalidSnapshot(format!(
                    "duplicate record id {}",
                    record.id
                )));
            }
        }

        Ok(())
    }
}
