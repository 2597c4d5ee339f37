//! Budget Reporting
//!
//! Plain-text rendering of budget status and usage breakdowns.

use super::budget::BudgetStatus;
use super::period::BudgetPeriod;
use super::record::UsageSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Percent of budget at which the report flags spend as close to the limit
pub const NEAR_LIMIT_PERCENT: f64 = 80.0;

/// Budget report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetReport {
    /// When report was generated
    pub generated_at: DateTime<Utc>,
    /// Period the budget applies to
    pub period: BudgetPeriod,
    /// Budget status
    pub status: BudgetStatus,
    /// Usage within the period
    pub summary: UsageSummary,
}

impl BudgetReport {
    /// Assemble a report
    #[must_use]
    pub fn new(period: BudgetPeriod, status: BudgetStatus, summary: UsageSummary) -> Self {
        Self {
            generated_at: Utc::now(),
            period,
            status,
            summary,
        }
    }
}

/// Format report as text
#[must_use]
pub fn format_report(report: &BudgetReport) -> String {
    let status = &report.status;
    let mut output = String::new();

    output.push_str("Budget Report\n\n");
    output.push_str(&format!(
        "Generated: {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("Period: {}\n", report.period));

    output.push_str("\nBudget:\n");
    output.push_str(&format!(
        "• Used: ${:.4} of ${:.2} ({:.1}%)\n",
        status.used, status.limit, status.percent_used
    ));
    output.push_str(&format!("• Remaining: ${:.4}\n", status.remaining));
    output.push_str(&format!(
        "• Projected end of period: ${:.4}\n",
        status.projected_end_of_period
    ));

    if status.is_exceeded() {
        output.push_str("• Budget exceeded: routing to the zero-cost fallback\n");
    } else if status.percent_used >= NEAR_LIMIT_PERCENT {
        output.push_str("• Approaching budget limit\n");
    }

    let summary = &report.summary;
    output.push_str("\nUsage:\n");
    output.push_str(&format!("• Total Calls: {}\n", summary.total_calls));
    output.push_str(&format!("• Total Tokens: {}\n", summary.total_tokens));
    output.push_str(&format!("• Total Cost: ${:.4}\n", summary.total_cost));

    if let Some(model) = summary.most_expensive_model() {
        output.push_str(&format!("• Most Expensive Model: {}\n", model));
    }

    if !summary.by_model.is_empty() {
        output.push_str("\nBy Model:\n");
        for (model, usage) in &summary.by_model {
            output.push_str(&format!(
                "• {}: {} requests, {} tokens, ${:.4}\n",
                model,
                usage.request_count,
                usage.input_tokens + usage.output_tokens,
                usage.total_cost
            ));
        }
    }

    if !summary.by_task_type.is_empty() {
        output.push_str("\nBy Task Type:\n");
        for (task_type, usage) in &summary.by_task_type {
            output.push_str(&format!(
                "• {}: {} requests, ${:.4}\n",
                task_type, usage.count, usage.cost
            ));
        }
    }

    output
}
