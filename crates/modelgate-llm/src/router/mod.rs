//! Router - budget-aware model selection
//!
//! This module picks one model per request by walking a fixed ladder:
//! budget breach, routing rule, heuristic tiers, zero-cost fallback.
//!
//! ## Budget Awareness
//!
//! - **Hard stop**: once period spend reaches the limit, every call gets the
//!   zero-cost fallback
//! - **Affordability**: each candidate is priced from the context's token
//!   estimate and only chosen if it fits under the remaining budget
//! - **No phantom spend**: selection never records usage
//!
//! # Module Structure
//!
//! - `types`: Task context, complexity, and decision types
//! - `rules`: Routing rules, conditions, and the ordered rule set
//! - `config`: Model and router configuration
//! - `router_impl`: ModelRouter implementation

mod config;
mod router_impl;
mod rules;
mod types;


pub use config::{
    default_model_configs, HeuristicModels, ModelConfig, RouterConfig, RouterConfigUpdate,
};
pub use router_impl::{ModelRouter, RULE_DEFAULT_TOKENS};
pub use rules::{default_rules, RoutingRule, RuleCondition, RuleSet};
pub use types::{Complexity, HeuristicTier, RoutingDecision, SelectionReason, TaskContext};
