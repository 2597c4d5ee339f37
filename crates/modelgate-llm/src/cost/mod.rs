//! Cost Tracking - spend ledger and budget status
//!
//! This module records usage, prices it, and answers budget questions
//! for the router.
//!
//! # Module Structure
//!
//! - `pricing`: Model prices and cost calculation
//! - `period`: Budget periods and window arithmetic
//! - `record`: Usage records and summaries
//! - `budget`: Derived budget status
//! - `snapshot`: Import/export document
//! - `ledger`: SpendLedger implementation
//! - `retention`: Background pruning task
//! - `report`: Text reports

mod budget;
mod ledger;
mod period;
mod pricing;
mod record;
mod report;
mod retention;
mod snapshot;

#[cfg(test)]
mod tests;

// Re-export public types
pub use budget::BudgetStatus;
pub use ledger::{SpendLedger, RETENTION_DAYS};
pub use period::{BudgetConfig, BudgetPeriod};
pub use pricing::{default_pricing, split_estimated_tokens, ModelPricing, PriceTable};
pub use record::{ModelUsage, TaskTypeUsage, UsageRecord, UsageSummary, UNKNOWN_TASK_TYPE};
pub use report::{format_report, BudgetReport};
pub use retention::{spawn_retention_task, MIN_SWEEP_INTERVAL};
pub use snapshot::LedgerSnapshot;
