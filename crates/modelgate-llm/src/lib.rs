//! Modelgate LLM - Budget-aware model routing
//!
//! This crate decides which model variant serves each completion request:
//! - Cost: spend ledger, price table, and budget windows
//! - Router: routing rules, heuristic selection, and the zero-cost fallback
//!
//! Completion execution lives outside this crate. The router only selects
//! and prices models; callers report realized usage back through
//! [`ModelRouter::track_usage`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cost;
pub mod error;
pub mod models;
pub mod router;

pub use cost::{
    default_pricing, spawn_retention_task, BudgetConfig, BudgetPeriod, BudgetStatus,
    LedgerSnapshot, ModelPricing, ModelUsage, PriceTable, SpendLedger, TaskTypeUsage,
    UsageRecord, UsageSummary,
};
pub use error::{Error, Result};
pub use router::{
    default_model_configs, Complexity, HeuristicModels, HeuristicTier, ModelConfig, ModelRouter,
    RouterConfig, RouterConfigUpdate, RoutingDecision, RoutingRule, RuleCondition, RuleSet,
    SelectionReason, TaskContext,
};
