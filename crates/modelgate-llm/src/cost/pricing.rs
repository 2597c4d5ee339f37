//! Model Pricing - per-model token prices
//!
//! Prices are USD per 1M tokens. A model missing from the table is priced
//! at zero and logged, so routing keeps working for models that were added
//! before anyone entered their price.

use crate::models;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

// ============================================================================
// Constants
// ============================================================================

/// Share of an estimated token count treated as input tokens
pub const ESTIMATE_INPUT_SHARE: f64 = 0.7;

/// Share of an estimated token count treated as output tokens
pub const ESTIMATE_OUTPUT_SHARE: f64 = 0.3;

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

// Anthropic Claude family
/// Claude Sonnet 4.5 input cost per 1M tokens
pub const CLAUDE_SONNET45_INPUT_COST: f64 = 3.00;
/// Claude Sonnet 4.5 output cost per 1M tokens
pub const CLAUDE_SONNET45_OUTPUT_COST: f64 = 15.00;
/// Claude Opus input cost per 1M tokens
pub const CLAUDE_OPUS_INPUT_COST: f64 = 15.00;
/// Claude Opus output cost per 1M tokens
pub const CLAUDE_OPUS_OUTPUT_COST: f64 = 75.00;
/// Claude Haiku 4.5 input cost per 1M tokens
pub const CLAUDE_HAIKU45_INPUT_COST: f64 = 0.80;
/// Claude Haiku 4.5 output cost per 1M tokens
pub const CLAUDE_HAIKU45_OUTPUT_COST: f64 = 4.00;

// Google Gemini 2.5 family
/// Gemini 2.5 Pro input cost per 1M tokens
pub const GEMINI_PRO_INPUT_COST: f64 = 1.25;
/// Gemini 2.5 Pro output cost per 1M tokens
pub const GEMINI_PRO_OUTPUT_COST: f64 = 5.00;
/// Gemini 2.5 Flash input cost per 1M tokens
pub const GEMINI_FLASH_INPUT_COST: f64 = 0.075;
/// Gemini 2.5 Flash output cost per 1M tokens
pub const GEMINI_FLASH_OUTPUT_COST: f64 = 0.30;

// ============================================================================
// Cost Models
// ============================================================================

/// Pricing information for a model (per 1M tokens)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    /// Cost per 1M input tokens (USD)
    pub input_cost_per_million: f64,
    /// Cost per 1M output tokens (USD)
    pub output_cost_per_million: f64,
}

impl ModelPricing {
    /// Pricing for models that cost nothing to run (local inference)
    pub const FREE: Self = Self {
        input_cost_per_million: 0.0,
        output_cost_per_million: 0.0,
    };

    /// Create pricing from per-million input and output costs
    #[must_use]
    pub const fn new(input_cost_per_million: f64, output_cost_per_million: f64) -> Self {
        Self {
            input_cost_per_million,
            output_cost_per_million,
        }
    }

    /// Calculate cost for given token counts
    #[must_use]
    pub fn calculate_cost(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        let input_cost = (f64::from(input_tokens) / TOKENS_PER_MILLION) * self.input_cost_per_million;
        let output_cost =
            (f64::from(output_tokens) / TOKENS_PER_MILLION) * self.output_cost_per_million;
        input_cost + output_cost
    }

    /// Whether this model is free to run
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.input_cost_per_million == 0.0 && self.output_cost_per_million == 0.0
    }
}

/// Split an estimated total token count into (input, output) tokens.
///
/// Both parts are floored, so their sum can be one short of `tokens`.
#[must_use]
pub fn split_estimated_tokens(tokens: u32) -> (u32, u32) {
    let total = f64::from(tokens);
    let input = (total * ESTIMATE_INPUT_SHARE).floor() as u32;
    let output = (total * ESTIMATE_OUTPUT_SHARE).floor() as u32;
    (input, output)
}

/// Mapping from model identifier to its token prices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceTable {
    prices: HashMap<String, ModelPricing>,
}

impl PriceTable {
    /// Create an empty price table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[must_use]
    pub fn with_price(mut self, model: impl Into<String>, pricing: ModelPricing) -> Self {
        self.insert(model, pricing);
        self
    }

    /// Insert or replace the price of a model, returning the previous price
    pub fn insert(&mut self, model: impl Into<String>, pricing: ModelPricing) -> Option<ModelPricing> {
        self.prices.insert(model.into(), pricing)
    }

    /// Get pricing for a model
    #[must_use]
    pub fn get(&self, model: &str) -> Option<&ModelPricing> {
        self.prices.get(model)
    }

    /// Whether the table knows this model
    #[must_use]
    pub fn contains(&self, model: &str) -> bool {
        self.prices.contains_key(model)
    }

    /// Number of priced models
    #[must_use]
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Calculate the cost of a usage event.
    ///
    /// Unknown models cost zero; a warning is logged instead of failing.
    #[must_use]
    pub fn calculate_cost(&self, model: &str, input_tokens: u32, output_tokens: u32) -> f64 {
        match self.prices.get(model) {
            Some(pricing) => pricing.calculate_cost(input_tokens, output_tokens),
            None => {
                warn!(model = %model, "Unknown model pricing, assuming $0");
                0.0
            }
        }
    }

    /// Estimate the cost of `tokens` total tokens using the 70/30 input/output split
    #[must_use]
    pub fn estimate_cost(&self, model: &str, tokens: u32) -> f64 {
        let (input_tokens, output_tokens) = split_estimated_tokens(tokens);
        self.calculate_cost(model, input_tokens, output_tokens)
    }
}

impl<S: Into<String>> FromIterator<(S, ModelPricing)> for PriceTable {
    fn from_iter<I: IntoIterator<Item = (S, ModelPricing)>>(iter: I) -> Self {
        Self {
            prices: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Default pricing for the models the default router knows about
#[must_use]
pub fn default_pricing() -> PriceTable {
    PriceTable::from_iter([
        (
            models::CLAUDE_SONNET_45,
            ModelPricing::new(CLAUDE_SONNET45_INPUT_COST, CLAUDE_SONNET45_OUTPUT_COST),
        ),
        (
            models::CLAUDE_OPUS_45,
            ModelPricing::new(CLAUDE_OPUS_INPUT_COST, CLAUDE_OPUS_OUTPUT_COST),
        ),
        (
            models::CLAUDE_OPUS_46,
            ModelPricing::new(CLAUDE_OPUS_INPUT_COST, CLAUDE_OPUS_OUTPUT_COST),
        ),
        (
            models::CLAUDE_HAIKU_45,
            ModelPricing::new(CLAUDE_HAIKU45_INPUT_COST, CLAUDE_HAIKU45_OUTPUT_COST),
        ),
        (
            models::GEMINI_PRO,
            ModelPricing::new(GEMINI_PRO_INPUT_COST, GEMINI_PRO_OUTPUT_COST),
        ),
        (
            models::GEMINI_FLASH,
            ModelPricing::new(GEMINI_FLASH_INPUT_COST, GEMINI_FLASH_OUTPUT_COST),
        ),
        // Local model
        (models::OLLAMA_LLAMA, ModelPricing::FREE),
    ])
}
