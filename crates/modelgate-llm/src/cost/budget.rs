//! Budget status derived from the ledger

use super::period::BudgetConfig;
use serde::{Deserialize, Serialize};

/// Point-in-time view of spend against the configured budget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    /// Spend within the current period (USD)
    pub used: f64,
    /// Configured ceiling (USD)
    pub limit: f64,
    /// `max(0, limit - used)`
    pub remaining: f64,
    /// `used / limit * 100`; not clamped, values above 100 show the overrun
    pub percent_used: f64,
    /// Linear extrapolation of `used` to the end of the period
    pub projected_end_of_period: f64,
}

impl BudgetStatus {
    /// Derive a status from period spend.
    ///
    /// `elapsed_fraction` is the share of the period already gone; at zero the
    /// projection is `used` itself.
    #[must_use]
    pub fn compute(used: f64, budget: &BudgetConfig, elapsed_fraction: f64) -> Self {
        let projected_end_of_period = if elapsed_fraction > 0.0 {
            used / elapsed_fraction
        } else {
            used
        };

        Self {
            used,
            limit: budget.limit,
            remaining: (budget.limit - used).max(0.0),
            percent_used: used / budget.limit * 100.0,
            projected_end_of_period,
        }
    }

    /// Spend has reached or passed the ceiling
    #[must_use]
    pub fn is_exceeded(&self) -> bool {
        self.percent_used >= 100.0
    }

    /// Whether `additional_cost` more still fits under the ceiling
    #[must_use]
    pub fn can_afford(&self, additional_cost: f64) -> bool {
        self.used + additional_cost <= self.limit
    }
}
