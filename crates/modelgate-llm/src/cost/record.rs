//! Usage Records and Summaries
//!
//! This module contains types for tracking LLM usage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Task type label used for records reported without one
pub const UNKNOWN_TASK_TYPE: &str = "unknown";

/// A single usage event.
///
/// `cost` is fixed when the record is created; later price changes never
/// touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    /// Record ID
    pub id: String,
    /// When the usage happened
    pub timestamp: DateTime<Utc>,
    /// Model identifier
    pub model: String,
    /// Input tokens
    pub input_tokens: u32,
    /// Output tokens
    pub output_tokens: u32,
    /// Cost (USD) at the time of recording
    pub cost: f64,
    /// Task type the usage was reported under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
}

impl UsageRecord {
    /// Input plus output tokens
    #[must_use]
    pub fn total_tokens(&self) -> u64 {
        u64::from(self.input_tokens) + u64::from(self.output_tokens)
    }
}

/// Aggregated usage within a period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSummary {
    /// Number of usage events
    pub total_calls: u64,
    /// Input plus output tokens
    pub total_tokens: u64,
    /// Total cost (USD)
    pub total_cost: f64,
    /// Usage by model
    pub by_model: BTreeMap<String, ModelUsage>,
    /// Usage by task type
    pub by_task_type: BTreeMap<String, TaskTypeUsage>,
}

/// Per-model usage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelUsage {
    /// Request count
    pub request_count: u64,
    /// Total input tokens
    pub input_tokens: u64,
    /// Total output tokens
    pub output_tokens: u64,
    /// Total cost
    pub total_cost: f64,
}

/// Per-task-type usage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskTypeUsage {
    /// Request count
    pub count: u64,
    /// Total cost
    pub cost: f64,
}

impl UsageSummary {
    /// Aggregate a set of records
    #[must_use]
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a UsageRecord>) -> Self {
        let mut summary = Self::default();

        for record in records {
            summary.total_calls += 1;
            summary.total_tokens += record.total_tokens();
            summary.total_cost += record.cost;

            let model = summary.by_model.entry(record.model.clone()).or_default();
            model.request_count += 1;
            model.input_tokens += u64::from(record.input_tokens);
            model.output_tokens += u64::from(record.output_tokens);
            model.total_cost += record.cost;

            let task_type = record
                .task_type
                .clone()
                .unwrap_or_else(|| UNKNOWN_TASK_TYPE.to_string());
            let task = summary.by_task_type.entry(task_type).or_default();
            task.count += 1;
            task.cost += record.cost;
        }

        summary
    }

    /// Model with the highest total cost
    #[must_use]
    pub fn most_expensive_model(&self) -> Option<&str> {
        self.by_model
            .iter()
            .max_by(|a, b| {
                a.1.total_cost
                    .partial_cmp(&b.1.total_cost)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(name, _)| name.as_str())
    }
}
