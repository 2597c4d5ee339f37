//! Budget periods and windows
//!
//! A period is the *current* calendar day, week or month in the caller's
//! timezone, not a rolling lookback. "day" at 00:05 covers five minutes.

use crate::error::{Error, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Recurring window over which spend accumulates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// Since local midnight today
    #[default]
    Day,
    /// Since local midnight of the most recent Sunday
    Week,
    /// Since local midnight on the first of the month
    Month,
}

impl BudgetPeriod {
    /// All periods, shortest first
    pub const ALL: [BudgetPeriod; 3] = [BudgetPeriod::Day, BudgetPeriod::Week, BudgetPeriod::Month];

    /// Lowercase name as used in snapshots and config
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// Nominal length used for end-of-period projection.
    ///
    /// Months are always 30 days.
    #[must_use]
    pub fn duration(&self) -> Duration {
        match self {
            Self::Day => Duration::days(1),
            Self::Week => Duration::days(7),
            Self::Month => Duration::days(30),
        }
    }

    /// Start of the current period instance containing `now`, in `now`'s timezone
    #[must_use]
    pub fn start_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Utc> {
        let today = now.date_naive();
        let first_day = match self {
            Self::Day => today,
            Self::Week => {
                today - Duration::days(i64::from(now.weekday().num_days_from_sunday()))
            }
            Self::Month => {
                NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today)
            }
        };
        local_midnight(&now.timezone(), first_day)
    }

    /// Fraction of the nominal period elapsed at `now` (0.0 at period start)
    #[must_use]
    pub fn elapsed_fraction_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> f64 {
        let start = self.start_at(now);
        let elapsed = now.with_timezone(&Utc) - start;
        let total = self.duration().num_milliseconds() as f64;
        (elapsed.num_milliseconds().max(0) as f64) / total
    }
}

/// Midnight of `date` in `tz`, converted to UTC.
///
/// When midnight falls into a DST gap the naive time is read as UTC.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Self::Day),
            "week" | "weekly" => Ok(Self::Week),
            "month" | "monthly" => Ok(Self::Month),
            other => Err(Error::InvalidConfig(format!(
                "unknown budget period '{other}' (expected day, week or month)"
            ))),
        }
    }
}

fn default_limit() -> f64 {
    5.0
}

/// Budget ceiling and the period it applies to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Spend ceiling in USD
    #[serde(default = "default_limit")]
    pub limit: f64,
    /// Window the ceiling applies to
    #[serde(default)]
    pub period: BudgetPeriod,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            period: BudgetPeriod::Day,
        }
    }
}

impl BudgetConfig {
    /// Create a validated budget
    pub fn new(limit: f64, period: BudgetPeriod) -> Result<Self> {
        let budget = Self { limit, period };
        budget.validate()?;
        Ok(budget)
    }

    /// The limit must be a positive, finite amount
    pub fn validate(&self) -> Result<()> {
        if !self.limit.is_finite() || self.limit <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "budget limit must be a positive amount, got {}",
                self.limit
            )));
        }
        Ok(())
    }
}
