//! Core types for model routing
//!
//! This module contains the per-call task context and the types describing
//! a routing decision.

use super::config::ModelConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Complexity
// ============================================================================

/// Caller's estimate of how demanding a task is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// Formatting, lookups, short answers
    Low,
    /// Ordinary generation
    Medium,
    /// Multi-step reasoning
    High,
}

impl Complexity {
    /// Lowercase name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Complexity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(Error::InvalidConfig(format!(
                "unknown complexity '{other}' (expected low, medium or high)"
            ))),
        }
    }
}

// ============================================================================
// Task Context
// ============================================================================

/// Per-call description of the task being routed. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskContext {
    /// Task type label
    #[serde(rename = "type")]
    pub task_type: String,
    /// Prompt text
    #[serde(default)]
    pub prompt: String,
    /// Estimated complexity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_complexity: Option<Complexity>,
    /// Estimated total tokens (input + output)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_tokens: Option<u32>,
    /// Task needs strong reasoning
    #[serde(default)]
    pub requires_reasoning: bool,
    /// Task is latency sensitive
    #[serde(default)]
    pub requires_speed: bool,
}

impl TaskContext {
    /// Create a context with a task type and prompt
    #[must_use]
    pub fn new(task_type: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            task_type: task_type.into(),
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Set estimated complexity
    #[must_use]
    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.estimated_complexity = Some(complexity);
        self
    }

    /// Set estimated token count
    #[must_use]
    pub fn with_estimated_tokens(mut self, tokens: u32) -> Self {
        self.estimated_tokens = Some(tokens);
        self
    }

    /// Mark the task as needing reasoning
    #[must_use]
    pub fn with_reasoning(mut self) -> Self {
        self.requires_reasoning = true;
        self
    }

    /// Mark the task as latency sensitive
    #[must_use]
    pub fn with_speed(mut self) -> Self {
        self.requires_speed = true;
        self
    }

    /// Token estimate, or `default` when none (or zero) was given
    #[must_use]
    pub fn tokens_or(&self, default: u32) -> u32 {
        self.estimated_tokens
            .filter(|tokens| *tokens > 0)
            .unwrap_or(default)
    }
}

// ============================================================================
// Heuristic Tier
// ============================================================================

/// Tiers tried, in order, when no routing rule matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeuristicTier {
    /// High complexity or reasoning required
    Reasoning,
    /// Medium complexity
    Balanced,
    /// Speed required or low complexity
    Fast,
    /// Everything else
    Default,
}

impl HeuristicTier {
    /// Token estimate used when the context carries none
    #[must_use]
    pub fn default_tokens(&self) -> u32 {
        match self {
            Self::Reasoning => 2000,
            Self::Balanced => 1500,
            Self::Fast | Self::Default => 1000,
        }
    }

    /// Whether the context qualifies for this tier
    #[must_use]
    pub fn applies_to(&self, context: &TaskContext) -> bool {
        let complexity = context.estimated_complexity;
        match self {
            Self::Reasoning => complexity == Some(Complexity::High) || context.requires_reasoning,
            Self::Balanced => complexity == Some(Complexity::Medium),
            Self::Fast => context.requires_speed || complexity == Some(Complexity::Low),
            Self::Default => true,
        }
    }

    /// Snake-case name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reasoning => "reasoning",
            Self::Balanced => "balanced",
            Self::Fast => "fast",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for HeuristicTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Routing Decision
// ============================================================================

/// Which branch of the decision ladder produced a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "branch", rename_all = "snake_case")]
pub enum SelectionReason {
    /// Period spend reached the limit; every rule was skipped
    BudgetExhausted,
    /// A rule matched and its preferred model was affordable
    RulePreferred {
        /// Matching rule
        rule_id: String,
    },
    /// A rule matched and only its fallback model was affordable
    RuleFallback {
        /// Matching rule
        rule_id: String,
    },
    /// A rule matched but neither of its models was affordable
    RuleBudgetFallback {
        /// Matching rule
        rule_id: String,
    },
    /// No rule matched; a heuristic tier was affordable
    Heuristic {
        /// Tier that won
        tier: HeuristicTier,
    },
    /// No rule matched and no heuristic tier was affordable
    NoAffordableModel,
}

impl SelectionReason {
    /// Whether the zero-cost fallback was chosen because nothing else fit
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(
            self,
            Self::BudgetExhausted | Self::RuleBudgetFallback { .. } | Self::NoAffordableModel
        )
    }
}

impl fmt::Display for SelectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BudgetExhausted => write!(f, "budget exhausted"),
            Self::RulePreferred { rule_id } => write!(f, "rule '{rule_id}' (preferred)"),
            Self::RuleFallback { rule_id } => write!(f, "rule '{rule_id}' (fallback)"),
            Self::RuleBudgetFallback { rule_id } => {
                write!(f, "rule '{rule_id}' (nothing affordable)")
            }
            Self::Heuristic { tier } => write!(f, "heuristic ({tier})"),
            Self::NoAffordableModel => write!(f, "no affordable model"),
        }
    }
}

/// Selected model plus the reason it was chosen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    /// Execution parameters for the chosen model
    pub model: ModelConfig,
    /// Ladder branch taken
    pub reason: SelectionReason,
    /// Estimated cost of the chosen model for this task (USD)
    pub estimated_cost: f64,
}
