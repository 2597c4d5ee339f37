//! Configuration types for model routing
//!
//! This module contains per-model execution parameters and the router
//! configuration that ties models, rules, budget, and heuristics together.

use super::rules::{default_rules, RuleSet};
use super::types::HeuristicTier;
use crate::cost::{BudgetConfig, BudgetPeriod, PriceTable};
use crate::error::{Error, Result};
use crate::models;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

// ============================================================================
// Model Configuration
// ============================================================================

/// Execution parameters for one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier
    pub model: String,
    /// Relative capability rank (higher is stronger)
    #[serde(default)]
    pub priority: u32,
    /// Maximum completion tokens
    pub max_tokens: u32,
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Capability tags
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
}

impl ModelConfig {
    /// Create a config with conservative defaults
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            priority: 0,
            max_tokens: 2048,
            temperature: None,
            capabilities: BTreeSet::new(),
        }
    }

    /// Set priority
    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Set max tokens
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Add capability tags
    #[must_use]
    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities
            .extend(capabilities.into_iter().map(Into::into));
        self
    }

    /// Check for a capability tag
    #[must_use]
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }
}

/// Built-in model table, strongest first
#[must_use]
pub fn default_model_configs() -> Vec<ModelConfig> {
    vec![
        ModelConfig::new(models::CLAUDE_OPUS_45)
            .with_priority(4)
            .with_max_tokens(4096)
            .with_temperature(0.7)
            .with_capabilities(["reasoning", "coding", "analysis", "complex-tasks"]),
        ModelConfig::new(models::CLAUDE_SONNET_45)
            .with_priority(3)
            .with_max_tokens(4096)
            .with_temperature(0.7)
            .with_capabilities(["reasoning", "coding", "analysis"]),
        ModelConfig::new(models::GEMINI_PRO)
            .with_priority(2)
            .with_max_tokens(8192)
            .with_temperature(0.7)
            .with_capabilities(["reasoning", "coding", "multimodal"]),
        ModelConfig::new(models::GEMINI_FLASH)
            .with_priority(1)
            .with_max_tokens(8192)
            .with_temperature(0.7)
            .with_capabilities(["speed", "basic-tasks"]),
        ModelConfig::new(models::OLLAMA_LLAMA)
            .with_priority(0)
            .with_max_tokens(2048)
            .with_temperature(0.7)
            .with_capabilities(["local", "offline"]),
    ]
}

// ============================================================================
// Heuristic Models
// ============================================================================

/// Models used by the heuristic tiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicModels {
    /// High complexity or reasoning required
    pub reasoning: String,
    /// Medium complexity
    pub balanced: String,
    /// Speed required or low complexity
    pub fast: String,
    /// Everything else
    pub default: String,
}

impl Default for HeuristicModels {
    fn default() -> Self {
        Self {
            reasoning: models::CLAUDE_OPUS_45.to_string(),
            balanced: models::CLAUDE_SONNET_45.to_string(),
            fast: models::GEMINI_FLASH.to_string(),
            default: models::GEMINI_PRO.to_string(),
        }
    }
}

impl HeuristicModels {
    /// Model for a tier
    #[must_use]
    pub fn model_for(&self, tier: HeuristicTier) -> &str {
        match tier {
            HeuristicTier::Reasoning => &self.reasoning,
            HeuristicTier::Balanced => &self.balanced,
            HeuristicTier::Fast => &self.fast,
            HeuristicTier::Default => &self.default,
        }
    }

    fn iter(&self) -> impl Iterator<Item = &str> {
        [&self.reasoning, &self.balanced, &self.fast, &self.default]
            .into_iter()
            .map(String::as_str)
    }
}

// ============================================================================
// Router Configuration
// ============================================================================

fn default_fallback_model() -> String {
    models::OLLAMA_LLAMA.to_string()
}

/// Router configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Model overrides; models not listed use the built-in table
    pub models: Vec<ModelConfig>,
    /// Routing rules in evaluation order
    pub rules: RuleSet,
    /// Budget ceiling and period
    pub budget: BudgetConfig,
    /// Zero-cost model used when nothing else is affordable
    pub fallback_model: String,
    /// Heuristic tier models
    pub heuristics: HeuristicModels,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            models: default_model_configs(),
            rules: default_rules(),
            budget: BudgetConfig::default(),
            fallback_model: default_fallback_model(),
            heuristics: HeuristicModels::default(),
        }
    }
}

impl RouterConfig {
    /// Config for `model`: configured entry first, then the built-in table
    #[must_use]
    pub fn model_config(&self, model: &str) -> Option<ModelConfig> {
        self.models
            .iter()
            .find(|m| m.model == model)
            .cloned()
            .or_else(|| {
                default_model_configs()
                    .into_iter()
                    .find(|m| m.model == model)
            })
    }

    /// Check the configuration against a price table
    pub fn validate(&self, pricing: &PriceTable) -> Result<()> {
        self.budget.validate()?;

        if self.fallback_model.trim().is_empty() {
            return Err(Error::InvalidConfig("fallback model must be set".into()));
        }
        if let Some(price) = pricing.get(&self.fallback_model) {
            if !price.is_free() {
                return Err(Error::InvalidConfig(format!(
                    "fallback model {} must be zero-cost",
                    self.fallback_model
                )));
            }
        }

        let mut seen = HashSet::with_capacity(self.models.len());
        for model in &self.models {
            if model.model.trim().is_empty() {
                return Err(Error::InvalidConfig("model entry with empty name".into()));
            }
            if !seen.insert(model.model.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "model {} is configured more than once",
                    model.model
                )));
            }
        }

        for rule in self.rules.iter() {
            if rule.id.trim().is_empty() {
                return Err(Error::InvalidConfig("routing rule with empty id".into()));
            }
            if rule.task_type.trim().is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "routing rule {} has an empty task type",
                    rule.id
                )));
            }
        }

        let referenced = std::iter::once(self.fallback_model.as_str())
            .chain(self.heuristics.iter())
            .chain(self.rules.iter().flat_map(|rule| rule.models()));
        for model in referenced {
            if self.model_config(model).is_none() {
                return Err(Error::InvalidConfig(format!(
                    "model {model} has no configuration"
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Partial Update
// ============================================================================

/// Partial router configuration; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfigUpdate {
    /// Replace model overrides
    pub models: Option<Vec<ModelConfig>>,
    /// Replace routing rules
    pub rules: Option<RuleSet>,
    /// New budget limit
    pub budget_limit: Option<f64>,
    /// New budget period
    pub budget_period: Option<BudgetPeriod>,
    /// New zero-cost fallback
    pub fallback_model: Option<String>,
    /// Replace heuristic tier models
    pub heuristics: Option<HeuristicModels>,
}

impl RouterConfigUpdate {
    /// Apply onto `config`
    pub fn apply(self, config: &mut RouterConfig) {
        if let Some(models) = self.models {
            config.models = models;
        }
        if let Some(rules) = self.rules {
            config.rules = rules;
        }
        if let Some(limit) = self.budget_limit {
            config.budget.limit = limit;
        }
        if let Some(period) = self.budget_period {
            config.budget.period = period;
        }
        if let Some(fallback) = self.fallback_model {
            config.fallback_model = fallback;
        }
        if let Some(heuristics) = self.heuristics {
            config.heuristics = heuristics;
        }
    }
}
