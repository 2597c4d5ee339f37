//! Spend Ledger - usage records and budget queries
//!
//! The ledger is the single source of truth for "how much has been spent".
//! Record list and budget live behind one lock so a reader never sees a
//! half-applied write or a budget that does not match the records.

use super::budget::BudgetStatus;
use super::period::{BudgetConfig, BudgetPeriod};
use super::pricing::{default_pricing, ModelPricing, PriceTable};
use super::record::{UsageRecord, UsageSummary};
use super::snapshot::LedgerSnapshot;
use crate::error::Result;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};
use uuid::Uuid;

/// Days a usage record is retained
pub const RETENTION_DAYS: i64 = 90;

#[derive(Debug, Default)]
struct LedgerState {
    records: Vec<UsageRecord>,
    budget: BudgetConfig,
}

/// Append-only usage ledger with budget tracking
#[derive(Debug)]
pub struct SpendLedger {
    /// Pricing information
    pricing: RwLock<PriceTable>,
    /// Records and budget
    state: RwLock<LedgerState>,
    /// How long records are kept
    retention: Duration,
}

impl Default for SpendLedger {
    fn default() -> Self {
        Self::new(BudgetConfig::default())
    }
}

impl SpendLedger {
    /// Create a ledger with default pricing
    #[must_use]
    pub fn new(budget: BudgetConfig) -> Self {
        Self::with_pricing(budget, default_pricing())
    }

    /// Create a ledger with a caller-supplied price table
    #[must_use]
    pub fn with_pricing(budget: BudgetConfig, pricing: PriceTable) -> Self {
        Self {
            pricing: RwLock::new(pricing),
            state: RwLock::new(LedgerState {
                records: Vec::new(),
                budget,
            }),
            retention: Duration::days(RETENTION_DAYS),
        }
    }

    /// Override the retention window
    #[must_use]
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    fn read_state(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read_pricing(&self) -> RwLockReadGuard<'_, PriceTable> {
        self.pricing.read().unwrap_or_else(|e| e.into_inner())
    }

    // ========================================================================
    // Pricing
    // ========================================================================

    /// Update pricing for a model. Existing records keep their cost.
    pub fn update_pricing(&self, model: &str, pricing: ModelPricing) {
        let mut prices = self.pricing.write().unwrap_or_else(|e| e.into_inner());
        prices.insert(model, pricing);
    }

    /// Get pricing for a model
    #[must_use]
    pub fn get_pricing(&self, model: &str) -> Option<ModelPricing> {
        self.read_pricing().get(model).copied()
    }

    /// Copy of the current price table
    #[must_use]
    pub fn pricing(&self) -> PriceTable {
        self.read_pricing().clone()
    }

    /// Cost of a usage event; unknown models cost zero
    #[must_use]
    pub fn calculate_cost(&self, model: &str, input_tokens: u32, output_tokens: u32) -> f64 {
        self.read_pricing()
            .calculate_cost(model, input_tokens, output_tokens)
    }

    /// Estimated cost of `tokens` total tokens (70% input / 30% output)
    #[must_use]
    pub fn estimate_cost(&self, model: &str, tokens: u32) -> f64 {
        self.read_pricing().estimate_cost(model, tokens)
    }

    // ========================================================================
    // Recording
    // ========================================================================

    /// Record a usage event happening now
    pub fn record(
        &self,
        model: &str,
        input_tokens: u32,
        output_tokens: u32,
        task_type: Option<&str>,
    ) -> UsageRecord {
        self.record_at(model, input_tokens, output_tokens, task_type, Utc::now())
    }

    /// Record a usage event at an explicit time
    pub fn record_at(
        &self,
        model: &str,
        input_tokens: u32,
        output_tokens: u32,
        task_type: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> UsageRecord {
        let cost = self.calculate_cost(model, input_tokens, output_tokens);

        let record = UsageRecord {
            id: format!("usage-{}", Uuid::new_v4().simple()),
            timestamp,
            model: model.to_string(),
            input_tokens,
            output_tokens,
            cost,
            task_type: task_type.map(str::to_string),
        };

        let mut state = self.write_state();
        state.records.push(record.clone());

        // Records are not kept in timestamp order
        let cutoff = Utc::now() - self.retention;
        if state.records.iter().any(|r| r.timestamp < cutoff) {
            let removed = prune_before(&mut state.records, cutoff);
            debug!(removed, "Pruned expired usage records on write");
        }

        debug!(model = %record.model, cost = record.cost, "Recorded usage");
        record
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Records inside the current instance of `period`
    #[must_use]
    pub fn get_usage(&self, period: BudgetPeriod) -> Vec<UsageRecord> {
        self.get_usage_at(period, &Local::now())
    }

    /// Records inside the instance of `period` containing `now`
    #[must_use]
    pub fn get_usage_at<Tz: TimeZone>(
        &self,
        period: BudgetPeriod,
        now: &DateTime<Tz>,
    ) -> Vec<UsageRecord> {
        let start = period.start_at(now);
        self.read_state()
            .records
            .iter()
            .filter(|r| r.timestamp >= start)
            .cloned()
            .collect()
    }

    /// Budget status for the configured period
    #[must_use]
    pub fn budget_status(&self) -> BudgetStatus {
        self.budget_status_at(&Local::now())
    }

    /// Budget status evaluated at `now`
    #[must_use]
    pub fn budget_status_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> BudgetStatus {
        let state = self.read_state();
        let period = state.budget.period;
        let start = period.start_at(now);
        let used: f64 = state
            .records
            .iter()
            .filter(|r| r.timestamp >= start)
            .map(|r| r.cost)
            .sum();

        BudgetStatus::compute(used, &state.budget, period.elapsed_fraction_at(now))
    }

    /// Whether `additional_cost` more fits under the budget
    #[must_use]
    pub fn is_within_budget(&self, additional_cost: f64) -> bool {
        self.budget_status().can_afford(additional_cost)
    }

    /// Whether `additional_cost` more fits under the budget at `now`
    #[must_use]
    pub fn is_within_budget_at<Tz: TimeZone>(&self, additional_cost: f64, now: &DateTime<Tz>) -> bool {
        self.budget_status_at(now).can_afford(additional_cost)
    }

    /// Cost per model within the configured period
    #[must_use]
    pub fn model_breakdown(&self) -> BTreeMap<String, f64> {
        let period = self.budget().period;
        self.usage_summary(period)
            .by_model
            .into_iter()
            .map(|(model, usage)| (model, usage.total_cost))
            .collect()
    }

    /// Aggregated usage within the current instance of `period`
    #[must_use]
    pub fn usage_summary(&self, period: BudgetPeriod) -> UsageSummary {
        self.usage_summary_at(period, &Local::now())
    }

    /// Aggregated usage within the instance of `period` containing `now`
    #[must_use]
    pub fn usage_summary_at<Tz: TimeZone>(
        &self,
        period: BudgetPeriod,
        now: &DateTime<Tz>,
    ) -> UsageSummary {
        let start = period.start_at(now);
        let state = self.read_state();
        UsageSummary::from_records(state.records.iter().filter(|r| r.timestamp >= start))
    }

    /// All retained records
    #[must_use]
    pub fn records(&self) -> Vec<UsageRecord> {
        self.read_state().records.clone()
    }

    /// Number of retained records
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.read_state().records.len()
    }

    /// Current budget
    #[must_use]
    pub fn budget(&self) -> BudgetConfig {
        self.read_state().budget
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Replace limit and period together.
    ///
    /// Already-recorded usage is re-windowed against the new period.
    pub fn update_budget(&self, limit: f64, period: BudgetPeriod) -> Result<()> {
        let budget = BudgetConfig::new(limit, period)?;
        self.write_state().budget = budget;
        info!(limit, period = %period, "Budget updated");
        Ok(())
    }

    /// Drop every record
    pub fn clear_records(&self) {
        let mut state = self.write_state();
        let removed = state.records.len();
        state.records.clear();
        info!(removed, "Cleared usage records");
    }

    /// Remove records older than the retention window
    pub fn prune_expired(&self) -> usize {
        self.prune_expired_at(Utc::now())
    }

    /// Remove records older than the retention window, measured from `now`
    pub fn prune_expired_at(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.retention;
        let removed = prune_before(&mut self.write_state().records, cutoff);
        debug!(removed, "Pruned expired usage records");
        removed
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Capture records and budget
    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.read_state();
        LedgerSnapshot {
            records: state.records.clone(),
            budget_limit: state.budget.limit,
            budget_period: state.budget.period,
        }
    }

    /// Export records and budget as JSON
    pub fn export_data(&self) -> Result<String> {
        self.snapshot().to_json_pretty()
    }

    /// Replace records and budget from a JSON snapshot.
    ///
    /// The payload is validated in full first; on error the ledger is unchanged.
    pub fn import_data(&self, json: &str) -> Result<()> {
        self.restore(LedgerSnapshot::from_json(json)?)
    }

    /// Replace records and budget from a snapshot, validating it first
    pub fn restore(&self, snapshot: LedgerSnapshot) -> Result<()> {
        snapshot.validate()?;
        let budget = snapshot.budget();
        let count = snapshot.records.len();

        let mut state = self.write_state();
        state.records = snapshot.records;
        state.budget = budget;
        drop(state);

        info!(records = count, limit = budget.limit, period = %budget.period, "Imported ledger snapshot");
        Ok(())
    }
}

fn prune_before(records: &mut Vec<UsageRecord>, cutoff: DateTime<Utc>) -> usize {
    let before = records.len();
    records.retain(|r| r.timestamp >= cutoff);
    before - records.len()
}
