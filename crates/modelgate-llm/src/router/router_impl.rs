//! Model Router implementation
//!
//! This module contains the ModelRouter, which runs the decision ladder
//! against the spend ledger and owns the routing configuration.
//!
//! Selection never blocks on a writer for longer than an `Arc` clone:
//! configuration lives in an `Arc` that writers replace wholesale, and each
//! call evaluates one budget status snapshot taken at entry.

use super::config::{ModelConfig, RouterConfig, RouterConfigUpdate};
use super::rules::RoutingRule;
use super::types::{HeuristicTier, RoutingDecision, SelectionReason, TaskContext};
use crate::cost::{BudgetPeriod, BudgetStatus, PriceTable, SpendLedger, UsageRecord};
use crate::error::Result;
use std::sync::{Arc, RwLock, RwLockWriteGuard};
use tracing::{debug, info, instrument, warn};

/// Token estimate used for rule candidates when the context carries none
pub const RULE_DEFAULT_TOKENS: u32 = 1000;

const HEURISTIC_ORDER: [HeuristicTier; 4] = [
    HeuristicTier::Reasoning,
    HeuristicTier::Balanced,
    HeuristicTier::Fast,
    HeuristicTier::Default,
];

/// Budget-aware model router
#[derive(Debug)]
pub struct ModelRouter {
    config: RwLock<Arc<RouterConfig>>,
    ledger: Arc<SpendLedger>,
}

impl ModelRouter {
    /// Create a router with the default price table
    pub fn new(config: RouterConfig) -> Result<Self> {
        let ledger = SpendLedger::new(config.budget);
        Self::build(config, Arc::new(ledger))
    }

    /// Create a router with a caller-supplied price table
    pub fn with_pricing(config: RouterConfig, pricing: PriceTable) -> Result<Self> {
        let ledger = SpendLedger::with_pricing(config.budget, pricing);
        Self::build(config, Arc::new(ledger))
    }

    /// Create a router over an existing ledger.
    ///
    /// The ledger's budget wins over `config.budget`.
    pub fn with_ledger(mut config: RouterConfig, ledger: Arc<SpendLedger>) -> Result<Self> {
        config.budget = ledger.budget();
        Self::build(config, ledger)
    }

    fn build(config: RouterConfig, ledger: Arc<SpendLedger>) -> Result<Self> {
        config.validate(&ledger.pricing())?;
        info!(
            rules = config.rules.len(),
            fallback = %config.fallback_model,
            limit = config.budget.limit,
            period = %config.budget.period,
            "Model router initialized"
        );
        Ok(Self {
            config: RwLock::new(Arc::new(config)),
            ledger,
        })
    }

    /// Current configuration snapshot
    #[must_use]
    pub fn config(&self) -> Arc<RouterConfig> {
        let guard = self.config.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    /// Underlying spend ledger
    #[must_use]
    pub fn ledger(&self) -> &Arc<SpendLedger> {
        &self.ledger
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Select a model for a task. Never records usage.
    #[must_use]
    pub fn select_model(&self, task_type: &str, context: &TaskContext) -> ModelConfig {
        self.select_model_explained(task_type, context).model
    }

    /// Select a model and report which ladder branch chose it
    #[instrument(skip(self, context))]
    pub fn select_model_explained(&self, task_type: &str, context: &TaskContext) -> RoutingDecision {
        let config = self.config();
        let status = self.ledger.budget_status();

        if status.is_exceeded() {
            warn!(
                used = status.used,
                limit = status.limit,
                "Budget exceeded, using zero-cost fallback model"
            );
            return fallback_decision(&config, SelectionReason::BudgetExhausted);
        }

        let decision = match config.rules.find_match(task_type, context) {
            Some(rule) => self.select_by_rule(&config, &status, rule, context),
            None => self.heuristic_decision(&config, &status, context),
        };

        debug!(
            model = %decision.model.model,
            reason = %decision.reason,
            estimated_cost = decision.estimated_cost,
            "Model selected"
        );
        decision
    }

    /// Run only the heuristic tiers against the current budget
    #[must_use]
    pub fn select_by_heuristic(&self, context: &TaskContext) -> RoutingDecision {
        let config = self.config();
        let status = self.ledger.budget_status();
        self.heuristic_decision(&config, &status, context)
    }

    fn select_by_rule(
        &self,
        config: &RouterConfig,
        status: &BudgetStatus,
        rule: &RoutingRule,
        context: &TaskContext,
    ) -> RoutingDecision {
        let tokens = context.tokens_or(RULE_DEFAULT_TOKENS);

        let cost = self.candidate_cost(config, &rule.preferred_model, tokens);
        if status.can_afford(cost) {
            return decide(
                config,
                &rule.preferred_model,
                SelectionReason::RulePreferred {
                    rule_id: rule.id.clone(),
                },
                cost,
            );
        }

        if let Some(fallback) = &rule.fallback_model {
            let cost = self.candidate_cost(config, fallback, tokens);
            if status.can_afford(cost) {
                return decide(
                    config,
                    fallback,
                    SelectionReason::RuleFallback {
                        rule_id: rule.id.clone(),
                    },
                    cost,
                );
            }
        }

        fallback_decision(
            config,
            SelectionReason::RuleBudgetFallback {
                rule_id: rule.id.clone(),
            },
        )
    }

    fn heuristic_decision(
        &self,
        config: &RouterConfig,
        status: &BudgetStatus,
        context: &TaskContext,
    ) -> RoutingDecision {
        for tier in HEURISTIC_ORDER {
            if !tier.applies_to(context) {
                continue;
            }

            let model = config.heuristics.model_for(tier);
            let cost = self.candidate_cost(config, model, context.tokens_or(tier.default_tokens()));
            if status.can_afford(cost) {
                return decide(config, model, SelectionReason::Heuristic { tier }, cost);
            }
        }

        fallback_decision(config, SelectionReason::NoAffordableModel)
    }

    /// The zero-cost fallback is priced at zero regardless of the price table
    fn candidate_cost(&self, config: &RouterConfig, model: &str, tokens: u32) -> f64 {
        if model == config.fallback_model {
            0.0
        } else {
            self.ledger.estimate_cost(model, tokens)
        }
    }

    // ========================================================================
    // Ledger pass-through
    // ========================================================================

    /// Record realized usage
    pub fn track_usage(
        &self,
        model: &str,
        input_tokens: u32,
        output_tokens: u32,
        task_type: Option<&str>,
    ) -> UsageRecord {
        self.ledger
            .record(model, input_tokens, output_tokens, task_type)
    }

    /// Budget status for the configured period
    #[must_use]
    pub fn get_budget_status(&self) -> BudgetStatus {
        self.ledger.budget_status()
    }

    /// Estimated cost of `tokens` total tokens on `model`
    #[must_use]
    pub fn estimate_cost(&self, model: &str, tokens: u32) -> f64 {
        self.ledger.estimate_cost(model, tokens)
    }

    /// Export ledger records and budget as JSON
    pub fn export_snapshot(&self) -> Result<String> {
        self.ledger.export_data()
    }

    /// Replace ledger records and budget from JSON.
    ///
    /// On error neither the ledger nor the configuration changes.
    pub fn import_snapshot(&self, json: &str) -> Result<()> {
        let mut guard = self.write_config();
        self.ledger.import_data(json)?;

        let mut next = RouterConfig::clone(&**guard);
        next.budget = self.ledger.budget();
        *guard = Arc::new(next);
        Ok(())
    }

    // ========================================================================
    // Configuration mutation
    // ========================================================================

    /// Replace budget limit and period
    pub fn update_budget(&self, limit: f64, period: BudgetPeriod) -> Result<()> {
        self.mutate_config(|config| {
            config.budget.limit = limit;
            config.budget.period = period;
        })
    }

    /// Add a routing rule, replacing any rule with the same id
    pub fn add_routing_rule(&self, rule: RoutingRule) -> Result<()> {
        let id = rule.id.clone();
        self.mutate_config(|config| {
            config.rules.upsert(rule);
        })?;
        info!(rule = %id, "Routing rule added");
        Ok(())
    }

    /// Remove a routing rule. Returns whether a rule was removed.
    pub fn remove_routing_rule(&self, id: &str) -> bool {
        let mut guard = self.write_config();
        if guard.rules.get(id).is_none() {
            return false;
        }

        let mut next = RouterConfig::clone(&**guard);
        next.rules.remove(id);
        *guard = Arc::new(next);
        info!(rule = %id, "Routing rule removed");
        true
    }

    /// Apply a partial configuration update
    pub fn update_config(&self, update: RouterConfigUpdate) -> Result<()> {
        self.mutate_config(|config| update.apply(config))?;
        info!("Router configuration updated");
        Ok(())
    }

    fn write_config(&self) -> RwLockWriteGuard<'_, Arc<RouterConfig>> {
        self.config.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Copy, edit, validate, then swap. Budget changes reach the ledger first.
    fn mutate_config<F>(&self, edit: F) -> Result<()>
    where
        F: FnOnce(&mut RouterConfig),
    {
        let mut guard = self.write_config();
        let mut next = RouterConfig::clone(&**guard);
        edit(&mut next);
        next.validate(&self.ledger.pricing())?;

        if next.budget != guard.budget {
            self.ledger
                .update_budget(next.budget.limit, next.budget.period)?;
        }

        *guard = Arc::new(next);
        Ok(())
    }
}

fn decide(
    config: &RouterConfig,
    model: &str,
    reason: SelectionReason,
    estimated_cost: f64,
) -> RoutingDecision {
    RoutingDecision {
        model: config
            .model_config(model)
            .unwrap_or_else(|| ModelConfig::new(model)),
        reason,
        estimated_cost,
    }
}

fn fallback_decision(config: &RouterConfig, reason: SelectionReason) -> RoutingDecision {
    decide(config, &config.fallback_model, reason, 0.0)
}
