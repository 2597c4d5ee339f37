//! Routing rules for model selection
//!
//! Rules map a task type to a preferred model and an optional fallback,
//! optionally gated by a [`RuleCondition`]. A [`RuleSet`] keeps rules in
//! evaluation order, keyed by id.

use super::types::{Complexity, TaskContext};
use crate::models;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// Rule Condition
// ============================================================================

/// Predicate over a [`TaskContext`].
///
/// Conditions on an optional context field are false when the field is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleCondition {
    /// `requires_reasoning` is set
    RequiresReasoning,
    /// `requires_speed` is set
    RequiresSpeed,
    /// Estimated complexity is at least `level`
    ComplexityAtLeast {
        /// Lower bound (inclusive)
        level: Complexity,
    },
    /// Estimated complexity is at most `level`
    ComplexityAtMost {
        /// Upper bound (inclusive)
        level: Complexity,
    },
    /// Estimated tokens are at least `tokens`
    MinTokens {
        /// Lower bound (inclusive)
        tokens: u32,
    },
    /// Estimated tokens are at most `tokens`
    MaxTokens {
        /// Upper bound (inclusive)
        tokens: u32,
    },
    /// Prompt contains `text`, ignoring case
    PromptContains {
        /// Needle
        text: String,
    },
    /// Every nested condition holds (true when empty)
    All {
        /// Nested conditions
        conditions: Vec<RuleCondition>,
    },
    /// At least one nested condition holds (false when empty)
    Any {
        /// Nested conditions
        conditions: Vec<RuleCondition>,
    },
    /// Nested condition does not hold
    Not {
        /// Negated condition
        condition: Box<RuleCondition>,
    },
}

impl RuleCondition {
    /// Evaluate against a context
    #[must_use]
    pub fn evaluate(&self, context: &TaskContext) -> bool {
        match self {
            Self::RequiresReasoning => context.requires_reasoning,
            Self::RequiresSpeed => context.requires_speed,
            Self::ComplexityAtLeast { level } => {
                context.estimated_complexity.is_some_and(|c| c >= *level)
            }
            Self::ComplexityAtMost { level } => {
                context.estimated_complexity.is_some_and(|c| c <= *level)
            }
            Self::MinTokens { tokens } => context.estimated_tokens.is_some_and(|t| t >= *tokens),
            Self::MaxTokens { tokens } => context.estimated_tokens.is_some_and(|t| t <= *tokens),
            Self::PromptContains { text } => context
                .prompt
                .to_lowercase()
                .contains(&text.to_lowercase()),
            Self::All { conditions } => conditions.iter().all(|c| c.evaluate(context)),
            Self::Any { conditions } => conditions.iter().any(|c| c.evaluate(context)),
            Self::Not { condition } => !condition.evaluate(context),
        }
    }
}

// ============================================================================
// Routing Rule
// ============================================================================

/// Task-type routing preference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRule {
    /// Unique id; adding a rule with an existing id replaces it
    pub id: String,
    /// Task type matched exactly
    pub task_type: String,
    /// Model used when affordable
    pub preferred_model: String,
    /// Model tried when the preferred one is not affordable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_model: Option<String>,
    /// Extra gate evaluated against the task context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<RuleCondition>,
}

impl RoutingRule {
    /// Create an unconditional rule with no fallback
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        task_type: impl Into<String>,
        preferred_model: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            task_type: task_type.into(),
            preferred_model: preferred_model.into(),
            fallback_model: None,
            condition: None,
        }
    }

    /// Set the fallback model
    #[must_use]
    pub fn with_fallback(mut self, model: impl Into<String>) -> Self {
        self.fallback_model = Some(model.into());
        self
    }

    /// Gate the rule with a condition
    #[must_use]
    pub fn with_condition(mut self, condition: RuleCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Whether this rule applies to the task
    #[must_use]
    pub fn matches(&self, task_type: &str, context: &TaskContext) -> bool {
        self.task_type == task_type
            && self
                .condition
                .as_ref()
                .map_or(true, |condition| condition.evaluate(context))
    }

    /// Models this rule can route to
    pub fn models(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.preferred_model.as_str()).chain(self.fallback_model.as_deref())
    }
}

// ============================================================================
// Rule Set
// ============================================================================

/// Ordered routing rules keyed by id. First match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<RoutingRule>", into = "Vec<RoutingRule>")]
pub struct RuleSet {
    rules: IndexMap<String, RoutingRule>,
}

impl RuleSet {
    /// Create an empty rule set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rule, replacing any rule with the same id.
    ///
    /// The rule always lands at the end of the evaluation order.
    pub fn upsert(&mut self, rule: RoutingRule) -> Option<RoutingRule> {
        let previous = self.rules.shift_remove(&rule.id);
        self.rules.insert(rule.id.clone(), rule);
        previous
    }

    /// Remove a rule by id, keeping the order of the rest
    pub fn remove(&mut self, id: &str) -> Option<RoutingRule> {
        self.rules.shift_remove(id)
    }

    /// Get a rule by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RoutingRule> {
        self.rules.get(id)
    }

    /// First rule matching the task type whose condition holds
    #[must_use]
    pub fn find_match(&self, task_type: &str, context: &TaskContext) -> Option<&RoutingRule> {
        self.rules
            .values()
            .find(|rule| rule.matches(task_type, context))
    }

    /// Rules in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = &RoutingRule> {
        self.rules.values()
    }

    /// Number of rules
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl From<Vec<RoutingRule>> for RuleSet {
    fn from(rules: Vec<RoutingRule>) -> Self {
        rules.into_iter().collect()
    }
}

impl From<RuleSet> for Vec<RoutingRule> {
    fn from(set: RuleSet) -> Self {
        set.rules.into_values().collect()
    }
}

impl FromIterator<RoutingRule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = RoutingRule>>(iter: I) -> Self {
        let mut set = Self::new();
        for rule in iter {
            set.upsert(rule);
        }
        set
    }
}

/// Rules shipped with the default configuration
#[must_use]
pub fn default_rules() -> RuleSet {
    RuleSet::from(vec![
        RoutingRule::new("complex-reasoning", "reasoning", models::CLAUDE_OPUS_45)
            .with_fallback(models::CLAUDE_SONNET_45),
        RoutingRule::new("code-generation", "coding", models::CLAUDE_SONNET_45)
            .with_fallback(models::GEMINI_PRO),
        RoutingRule::new("simple-formatting", "formatting", models::GEMINI_FLASH)
            .with_fallback(models::OLLAMA_LLAMA),
        RoutingRule::new("data-analysis", "analysis", models::GEMINI_PRO)
            .with_fallback(models::CLAUDE_SONNET_45),
    ])
}
