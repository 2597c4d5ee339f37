//! Tests for cost module

use super::*;
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use std::sync::Arc;

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// Wednesday, 2026-03-18 12:00 UTC
fn wednesday_noon() -> DateTime<Utc> {
    utc(2026, 3, 18, 12, 0)
}

fn model_x_pricing() -> PriceTable {
    PriceTable::new()
        .with_price("modelX", ModelPricing::new(3.0, 15.0))
        .with_price("ten-per-million", ModelPricing::new(10.0, 0.0))
        .with_price("free-local", ModelPricing::FREE)
}

/// Ledger whose retention never drops the fixed-date records used here
fn fixed_date_ledger(limit: f64, period: BudgetPeriod) -> SpendLedger {
    SpendLedger::with_pricing(BudgetConfig::new(limit, period).unwrap(), model_x_pricing())
        .with_retention(Duration::days(365 * 100))
}

fn usage(id: &str, timestamp: DateTime<Utc>, model: &str, cost: f64) -> UsageRecord {
    UsageRecord {
        id: id.to_string(),
        timestamp,
        model: model.to_string(),
        input_tokens: 1000,
        output_tokens: 500,
        cost,
        task_type: None,
    }
}

// ============================================================================
// Pricing
// ============================================================================

#[test]
fn test_model_pricing_calculation() {
    let pricing = ModelPricing::new(10.0, 20.0);

    // 1M tokens each
    let cost = pricing.calculate_cost(1_000_000, 1_000_000);
    assert!((cost - 30.0).abs() < 1e-9);

    // 1K tokens each
    let cost = pricing.calculate_cost(1_000, 1_000);
    assert!((cost - 0.03).abs() < 1e-9);
}

#[test]
fn test_price_table_concrete_cost() {
    let table = model_x_pricing();
    let cost = table.calculate_cost("modelX", 100_000, 20_000);
    assert!((cost - 0.6).abs() < 1e-9);
}

#[test]
fn test_unknown_model_costs_nothing() {
    let table = model_x_pricing();
    assert_eq!(table.calculate_cost("not-priced", 1_000_000, 1_000_000), 0.0);
    assert_eq!(table.estimate_cost("not-priced", 50_000), 0.0);
}

#[test]
fn test_split_estimated_tokens() {
    assert_eq!(split_estimated_tokens(1000), (700, 300));
    assert_eq!(split_estimated_tokens(2000), (1400, 600));
    assert_eq!(split_estimated_tokens(0), (0, 0));
    // Floors both halves
    assert_eq!(split_estimated_tokens(3), (2, 0));
}

#[test]
fn test_estimate_cost_uses_split() {
    let table = model_x_pricing();
    // 1400 input * 3/M + 600 output * 15/M
    let expected = 1400.0 / 1e6 * 3.0 + 600.0 / 1e6 * 15.0;
    assert!((table.estimate_cost("modelX", 2000) - expected).abs() < 1e-12);
}

#[test]
fn test_default_pricing_has_router_models() {
    let pricing = default_pricing();

    assert!(pricing.contains(crate::models::CLAUDE_OPUS_45));
    assert!(pricing.contains(crate::models::CLAUDE_SONNET_45));
    assert!(pricing.contains(crate::models::CLAUDE_HAIKU_45));
    assert!(pricing.contains(crate::models::GEMINI_PRO));
    assert!(pricing.contains(crate::models::GEMINI_FLASH));

    let local = pricing.get(crate::models::OLLAMA_LLAMA).unwrap();
    assert!(local.is_free());
}

// ============================================================================
// Periods
// ============================================================================

#[test]
fn test_period_starts() {
    let now = wednesday_noon();

    assert_eq!(BudgetPeriod::Day.start_at(&now), utc(2026, 3, 18, 0, 0));
    // Most recent Sunday
    assert_eq!(BudgetPeriod::Week.start_at(&now), utc(2026, 3, 15, 0, 0));
    assert_eq!(BudgetPeriod::Month.start_at(&now), utc(2026, 3, 1, 0, 0));
}

#[test]
fn test_week_starts_today_on_sunday() {
    let sunday_morning = utc(2026, 3, 15, 9, 30);
    assert_eq!(
        BudgetPeriod::Week.start_at(&sunday_morning),
        utc(2026, 3, 15, 0, 0)
    );
}

#[test]
fn test_period_start_follows_caller_timezone() {
    let plus_five = FixedOffset::east_opt(5 * 3600).unwrap();
    // 01:00 local on the 18th is still the 17th in UTC
    let now = plus_five.with_ymd_and_hms(2026, 3, 18, 1, 0, 0).unwrap();

    assert_eq!(BudgetPeriod::Day.start_at(&now), utc(2026, 3, 17, 19, 0));
}

#[test]
fn test_elapsed_fraction() {
    let now = wednesday_noon();
    assert!((BudgetPeriod::Day.elapsed_fraction_at(&now) - 0.5).abs() < 1e-12);

    let midnight = utc(2026, 3, 18, 0, 0);
    assert_eq!(BudgetPeriod::Day.elapsed_fraction_at(&midnight), 0.0);

    // Month length is a flat 30 days
    let month_fraction = BudgetPeriod::Month.elapsed_fraction_at(&now);
    let expected = (17.0 * 24.0 + 12.0) / (30.0 * 24.0);
    assert!((month_fraction - expected).abs() < 1e-12);
}

#[test]
fn test_budget_period_parse_and_serde() {
    assert_eq!("day".parse::<BudgetPeriod>().unwrap(), BudgetPeriod::Day);
    assert_eq!("Weekly".parse::<BudgetPeriod>().unwrap(), BudgetPeriod::Week);
    assert_eq!("month".parse::<BudgetPeriod>().unwrap(), BudgetPeriod::Month);
    assert!("year".parse::<BudgetPeriod>().is_err());

    assert_eq!(serde_json::to_string(&BudgetPeriod::Week).unwrap(), "\"week\"");
    let parsed: BudgetPeriod = serde_json::from_str("\"month\"").unwrap();
    assert_eq!(parsed, BudgetPeriod::Month);
}

#[test]
fn test_budget_config_validation() {
    assert!(BudgetConfig::new(1.0, BudgetPeriod::Day).is_ok());
    assert!(BudgetConfig::new(0.0, BudgetPeriod::Day).is_err());
    assert!(BudgetConfig::new(-2.0, BudgetPeriod::Week).is_err());
    assert!(BudgetConfig::new(f64::NAN, BudgetPeriod::Month).is_err());
    assert!(BudgetConfig::new(f64::INFINITY, BudgetPeriod::Month).is_err());
}

// ============================================================================
// Ledger
// ============================================================================

#[test]
fn test_record_concrete_budget_scenario() {
    let ledger = SpendLedger::with_pricing(
        BudgetConfig::new(1.0, BudgetPeriod::Day).unwrap(),
        model_x_pricing(),
    );

    let record = ledger.record("modelX", 100_000, 20_000, None);
    assert!((record.cost - 0.6).abs() < 1e-9);

    let status = ledger.budget_status();
    assert!((status.used - 0.6).abs() < 1e-9);
    assert!((status.percent_used - 60.0).abs() < 1e-6);
    assert!((status.remaining - 0.4).abs() < 1e-9);
    assert_eq!(status.limit, 1.0);
    assert!(!status.is_exceeded());
}

#[test]
fn test_record_unknown_model_is_free() {
    let ledger = SpendLedger::with_pricing(BudgetConfig::default(), model_x_pricing());

    let record = ledger.record("mystery-model", 500_000, 500_000, Some("chat"));
    assert_eq!(record.cost, 0.0);
    assert_eq!(record.task_type.as_deref(), Some("chat"));
    assert_eq!(ledger.record_count(), 1);
    assert_eq!(ledger.budget_status().used, 0.0);
}

#[test]
fn test_record_ids_are_unique() {
    let ledger = SpendLedger::default();
    let a = ledger.record("modelX", 1, 1, None);
    let b = ledger.record("modelX", 1, 1, None);
    assert_ne!(a.id, b.id);
}

#[test]
fn test_spend_is_monotonic() {
    let ledger = SpendLedger::with_pricing(BudgetConfig::default(), model_x_pricing());

    let mut previous = ledger.budget_status().used;
    for _ in 0..5 {
        let record = ledger.record("modelX", 10_000, 1_000, None);
        let used = ledger.budget_status().used;
        assert!(used > previous);
        assert!((used - previous - record.cost).abs() < 1e-12);
        previous = used;
    }
}

#[test]
fn test_window_excludes_yesterday_from_day_only() {
    let ledger = fixed_date_ledger(10.0, BudgetPeriod::Day);
    let now = wednesday_noon();

    ledger.record_at("modelX", 1000, 0, None, utc(2026, 3, 18, 8, 0));
    ledger.record_at("modelX", 1000, 0, None, utc(2026, 3, 17, 10, 0)); // yesterday
    ledger.record_at("modelX", 1000, 0, None, utc(2026, 3, 10, 10, 0)); // last week
    ledger.record_at("modelX", 1000, 0, None, utc(2026, 2, 27, 10, 0)); // last month

    assert_eq!(ledger.get_usage_at(BudgetPeriod::Day, &now).len(), 1);
    assert_eq!(ledger.get_usage_at(BudgetPeriod::Week, &now).len(), 2);
    assert_eq!(ledger.get_usage_at(BudgetPeriod::Month, &now).len(), 3);
    assert_eq!(ledger.record_count(), 4);
}

#[test]
fn test_projection_is_linear_extrapolation() {
    let ledger = fixed_date_ledger(5.0, BudgetPeriod::Day);
    // 100k input tokens at $10/M = $1.00
    ledger.record_at("ten-per-million", 100_000, 0, None, utc(2026, 3, 18, 6, 0));

    let status = ledger.budget_status_at(&wednesday_noon());
    assert!((status.used - 1.0).abs() < 1e-9);
    assert!((status.projected_end_of_period - 2.0).abs() < 1e-9);
}

#[test]
fn test_projection_at_period_start_equals_used() {
    let ledger = fixed_date_ledger(5.0, BudgetPeriod::Day);
    let midnight = utc(2026, 3, 18, 0, 0);
    ledger.record_at("ten-per-million", 100_000, 0, None, midnight);

    let status = ledger.budget_status_at(&midnight);
    assert!((status.used - 1.0).abs() < 1e-9);
    assert!((status.projected_end_of_period - status.used).abs() < 1e-12);
}

#[test]
fn test_percent_used_is_not_clamped() {
    let ledger = fixed_date_ledger(1.0, BudgetPeriod::Day);
    ledger.record_at("ten-per-million", 150_000, 0, None, utc(2026, 3, 18, 9, 0));

    let status = ledger.budget_status_at(&wednesday_noon());
    assert!((status.percent_used - 150.0).abs() < 1e-6);
    assert_eq!(status.remaining, 0.0);
    assert!(status.is_exceeded());
}

#[test]
fn test_is_within_budget() {
    let ledger = fixed_date_ledger(1.0, BudgetPeriod::Day);
    let now = wednesday_noon();
    ledger.record_at("modelX", 100_000, 20_000, None, utc(2026, 3, 18, 9, 0));

    assert!(ledger.is_within_budget_at(0.0, &now));
    assert!(ledger.is_within_budget_at(0.3, &now));
    assert!(!ledger.is_within_budget_at(0.5, &now));
}

#[test]
fn test_update_budget_rewindows_history() {
    let ledger = fixed_date_ledger(10.0, BudgetPeriod::Day);
    let now = wednesday_noon();
    ledger.record_at("ten-per-million", 100_000, 0, None, utc(2026, 3, 10, 9, 0));

    assert_eq!(ledger.budget_status_at(&now).used, 0.0);

    ledger.update_budget(10.0, BudgetPeriod::Month).unwrap();
    assert!((ledger.budget_status_at(&now).used - 1.0).abs() < 1e-9);
    assert_eq!(ledger.budget().period, BudgetPeriod::Month);
}

#[test]
fn test_update_budget_rejects_invalid_limit() {
    let ledger = fixed_date_ledger(3.0, BudgetPeriod::Week);

    assert!(ledger.update_budget(0.0, BudgetPeriod::Day).is_err());
    assert!(ledger.update_budget(f64::NAN, BudgetPeriod::Day).is_err());

    let budget = ledger.budget();
    assert_eq!(budget.limit, 3.0);
    assert_eq!(budget.period, BudgetPeriod::Week);
}

#[test]
fn test_price_change_keeps_recorded_cost() {
    let ledger = SpendLedger::with_pricing(BudgetConfig::default(), model_x_pricing());
    let before = ledger.record("modelX", 100_000, 20_000, None);

    ledger.update_pricing("modelX", ModelPricing::new(300.0, 1500.0));

    let stored = ledger.records();
    assert_eq!(stored[0].cost, before.cost);
    assert_eq!(ledger.get_pricing("modelX").unwrap().input_cost_per_million, 300.0);
}

#[test]
fn test_clear_records() {
    let ledger = SpendLedger::with_pricing(BudgetConfig::default(), model_x_pricing());
    ledger.record("modelX", 1000, 1000, None);
    ledger.record("modelX", 1000, 1000, None);

    ledger.clear_records();
    assert_eq!(ledger.record_count(), 0);
    assert_eq!(ledger.budget_status().used, 0.0);
}

#[test]
fn test_usage_summary_groups_by_model_and_task() {
    let ledger = fixed_date_ledger(10.0, BudgetPeriod::Day);
    let now = wednesday_noon();
    let at = utc(2026, 3, 18, 9, 0);

    ledger.record_at("modelX", 100_000, 20_000, Some("coding"), at);
    ledger.record_at("modelX", 100_000, 20_000, Some("coding"), at);
    ledger.record_at("ten-per-million", 100_000, 0, None, at);

    let summary = ledger.usage_summary_at(BudgetPeriod::Day, &now);
    assert_eq!(summary.total_calls, 3);
    assert_eq!(summary.total_tokens, 340_000);
    assert!((summary.total_cost - 2.2).abs() < 1e-9);

    assert_eq!(summary.by_model["modelX"].request_count, 2);
    assert_eq!(summary.by_task_type["coding"].count, 2);
    assert_eq!(summary.by_task_type[UNKNOWN_TASK_TYPE].count, 1);
    assert_eq!(summary.most_expensive_model(), Some("modelX"));
}

// ============================================================================
// Retention
// ============================================================================

#[test]
fn test_expired_record_is_pruned_on_write() {
    let ledger = SpendLedger::with_pricing(BudgetConfig::default(), model_x_pricing());

    ledger.record_at(
        "modelX",
        1000,
        0,
        None,
        Utc::now() - Duration::days(RETENTION_DAYS + 1),
    );
    assert_eq!(ledger.record_count(), 0);

    ledger.record("modelX", 1000, 0, None);
    assert_eq!(ledger.record_count(), 1);
}

#[test]
fn test_backfilled_expired_record_is_pruned_on_write() {
    let ledger = SpendLedger::with_pricing(BudgetConfig::default(), model_x_pricing());

    ledger.record("modelX", 1000, 0, None);
    ledger.record_at(
        "modelX",
        1000,
        0,
        None,
        Utc::now() - Duration::days(RETENTION_DAYS + 5),
    );
    ledger.record("modelX", 1000, 0, None);

    assert_eq!(ledger.record_count(), 2);
    let cutoff = Utc::now() - Duration::days(RETENTION_DAYS);
    assert!(ledger.records().iter().all(|r| r.timestamp >= cutoff));
}

#[test]
fn test_unordered_restore_is_pruned_on_next_write() {
    let ledger = SpendLedger::with_pricing(BudgetConfig::default(), model_x_pricing());
    let now = Utc::now();
    let snapshot = LedgerSnapshot {
        records: vec![
            usage("fresh", now - Duration::days(1), "modelX", 0.1),
            usage("stale", now - Duration::days(RETENTION_DAYS + 10), "modelX", 0.1),
        ],
        budget_limit: 5.0,
        budget_period: BudgetPeriod::Day,
    };
    ledger.restore(snapshot).unwrap();
    assert_eq!(ledger.record_count(), 2);

    ledger.record("modelX", 1000, 0, None);

    let ids: Vec<String> = ledger.records().into_iter().map(|r| r.id).collect();
    assert_eq!(ids.len(), 2);
    assert_eq!(ids[0], "fresh");
    assert!(!ids.contains(&"stale".to_string()));
}

#[test]
fn test_prune_expired_at() {
    let ledger = SpendLedger::with_pricing(BudgetConfig::default(), model_x_pricing());
    let now = wednesday_noon();
    let snapshot = LedgerSnapshot {
        records: vec![
            usage("old", now - Duration::days(100), "modelX", 0.1),
            usage("recent", now - Duration::days(10), "modelX", 0.1),
            usage("edge", now - Duration::days(RETENTION_DAYS), "modelX", 0.1),
        ],
        budget_limit: 5.0,
        budget_period: BudgetPeriod::Day,
    };
    ledger.restore(snapshot).unwrap();

    assert_eq!(ledger.prune_expired_at(now), 1);
    let ids: Vec<String> = ledger.records().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["recent".to_string(), "edge".to_string()]);
}

#[tokio::test]
async fn test_retention_task_prunes_in_background() {
    let ledger = Arc::new(SpendLedger::with_pricing(
        BudgetConfig::default(),
        model_x_pricing(),
    ));
    let snapshot = LedgerSnapshot {
        records: vec![
            usage("old", Utc::now() - Duration::days(RETENTION_DAYS + 5), "modelX", 0.1),
            usage("fresh", Utc::now(), "modelX", 0.1),
        ],
        budget_limit: 5.0,
        budget_period: BudgetPeriod::Day,
    };
    ledger.restore(snapshot).unwrap();

    let handle = spawn_retention_task(Arc::clone(&ledger), std::time::Duration::from_millis(10));
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    handle.abort();

    assert_eq!(ledger.record_count(), 1);
    assert_eq!(ledger.records()[0].id, "fresh");
}

#[tokio::test]
async fn test_retention_task_accepts_zero_interval() {
    let ledger = Arc::new(SpendLedger::with_pricing(
        BudgetConfig::default(),
        model_x_pricing(),
    ));
    let snapshot = LedgerSnapshot {
        records: vec![usage(
            "old",
            Utc::now() - Duration::days(RETENTION_DAYS + 1),
            "modelX",
            0.1,
        )],
        budget_limit: 5.0,
        budget_period: BudgetPeriod::Day,
    };
    ledger.restore(snapshot).unwrap();

    let handle = spawn_retention_task(Arc::clone(&ledger), std::time::Duration::ZERO);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    assert!(!handle.is_finished());
    handle.abort();
    assert_eq!(ledger.record_count(), 0);
}

// ============================================================================
// Snapshots
// ============================================================================

#[test]
fn test_export_import_round_trip() {
    let source = fixed_date_ledger(2.0, BudgetPeriod::Week);
    let now = wednesday_noon();
    source.record_at("modelX", 100_000, 20_000, Some("coding"), utc(2026, 3, 16, 9, 0));
    source.record_at("ten-per-million", 10_000, 0, None, utc(2026, 3, 18, 9, 0));

    let exported = source.export_data().unwrap();

    let target = fixed_date_ledger(99.0, BudgetPeriod::Month);
    target.import_data(&exported).unwrap();

    assert_eq!(target.record_count(), source.record_count());
    assert_eq!(target.budget_status_at(&now), source.budget_status_at(&now));
    assert_eq!(target.records(), source.records());
}

#[test]
fn test_snapshot_json_shape() {
    let ledger = fixed_date_ledger(5.0, BudgetPeriod::Day);
    ledger.record_at("modelX", 10, 20, None, utc(2026, 3, 18, 9, 0));
    ledger.record_at("modelX", 10, 20, Some("coding"), utc(2026, 3, 18, 9, 0));

    let value: serde_json::Value = serde_json::from_str(&ledger.export_data().unwrap()).unwrap();
    assert_eq!(value["budgetLimit"], 5.0);
    assert_eq!(value["budgetPeriod"], "day");

    let first = &value["records"][0];
    assert_eq!(first["inputTokens"], 10);
    assert_eq!(first["outputTokens"], 20);
    assert_eq!(first["timestamp"], "2026-03-18T09:00:00Z");
    assert!(first.get("taskType").is_none());
    assert_eq!(value["records"][1]["taskType"], "coding");
}

#[test]
fn test_import_replaces_instead_of_merging() {
    let ledger = fixed_date_ledger(5.0, BudgetPeriod::Day);
    ledger.record_at("modelX", 10, 20, None, utc(2026, 3, 18, 9, 0));
    ledger.record_at("modelX", 10, 20, None, utc(2026, 3, 18, 9, 0));

    let json = r#"{
        "records": [{
            "id": "usage-1",
            "timestamp": "2026-03-18T08:00:00.000Z",
            "model": "modelX",
            "inputTokens": 1000,
            "outputTokens": 500,
            "cost": 0.25,
            "taskType": "analysis"
        }],
        "budgetLimit": 3.5,
        "budgetPeriod": "week"
    }"#;
    ledger.import_data(json).unwrap();

    assert_eq!(ledger.record_count(), 1);
    assert_eq!(ledger.budget().limit, 3.5);
    assert_eq!(ledger.budget().period, BudgetPeriod::Week);
    assert_eq!(ledger.records()[0].task_type.as_deref(), Some("analysis"));
}

#[test]
fn test_malformed_import_leaves_state_untouched() {
    let ledger = fixed_date_ledger(4.0, BudgetPeriod::Day);
    ledger.record_at("modelX", 100_000, 20_000, None, utc(2026, 3, 18, 9, 0));
    let before = ledger.snapshot();

    let payloads = [
        "not json at all",
        r#"{"records": [], "budgetLimit": 5.0}"#,
        r#"{"records": [], "budgetLimit": 5.0, "budgetPeriod": "year"}"#,
        r#"{"records": [], "budgetLimit": 0, "budgetPeriod": "day"}"#,
        r#"{"records": [], "budgetLimit": "five", "budgetPeriod": "day"}"#,
        r#"{"records": [{"id": "a", "timestamp": "yesterday", "model": "m",
            "inputTokens": 1, "outputTokens": 1, "cost": 0.1}],
            "budgetLimit": 5.0, "budgetPeriod": "day"}"#,
        r#"{"records": [{"id": "a", "timestamp": "2026-03-18T09:00:00Z", "model": "m",
            "inputTokens": 1, "outputTokens": 1, "cost": -0.1}],
            "budgetLimit": 5.0, "budgetPeriod": "day"}"#,
        r#"{"records": [
            {"id": "a", "timestamp": "2026-03-18T09:00:00Z", "model": "m",
             "inputTokens": 1, "outputTokens": 1, "cost": 0.1},
            {"id": "a", "timestamp": "2026-03-18T09:00:00Z", "model": "m",
             "inputTokens": 1, "outputTokens": 1, "cost": 0.1}],
            "budgetLimit": 5.0, "budgetPeriod": "day"}"#,
    ];

    for payload in payloads {
        let err = ledger.import_data(payload).unwrap_err();
        assert!(
            matches!(err, crate::Error::InvalidSnapshot(_)),
            "unexpected error for {payload}: {err}"
        );
        assert_eq!(ledger.snapshot(), before);
    }
}

#[test]
fn test_format_report() {
    let ledger = fixed_date_ledger(1.0, BudgetPeriod::Day);
    let now = wednesday_noon();
    ledger.record_at("modelX", 100_000, 20_000, Some("coding"), utc(2026, 3, 18, 9, 0));

    let report = BudgetReport::new(
        BudgetPeriod::Day,
        ledger.budget_status_at(&now),
        ledger.usage_summary_at(BudgetPeriod::Day, &now),
    );
    let formatted = format_report(&report);

    assert!(formatted.contains("Budget Report"));
    assert!(formatted.contains("Total Calls: 1"));
    assert!(formatted.contains("modelX"));
    assert!(formatted.contains("coding"));
}
