//! CLI command: `modelgate status`
//!
//! Displays budget status for the configured period plus the per-model and
//! per-task breakdown of spend.

use crate::app::App;
use modelgate_llm::cost::{format_report, BudgetReport};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::info;

/// Run the status subcommand.
pub async fn run(app: &App, json: bool, watch: bool) -> anyhow::Result<()> {
    if watch {
        run_watch(app).await
    } else if json {
        run_json(app)
    } else {
        run_table(app)
    }
}

fn report(app: &App) -> BudgetReport {
    let ledger = app.router.ledger();
    let period = ledger.budget().period;
    BudgetReport::new(period, ledger.budget_status(), ledger.usage_summary(period))
}

/// Plain-text report.
fn run_table(app: &App) -> anyhow::Result<()> {
    println!();
    println!("{}", format_report(&report(app)));
    Ok(())
}

/// JSON output for scripting.
fn run_json(app: &App) -> anyhow::Result<()> {
    let report = report(app);
    let output = serde_json::json!({
        "period": report.period,
        "status": report.status,
        "exceeded": report.status.is_exceeded(),
        "usage": report.summary,
        "generated_at": report.generated_at.to_rfc3339(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Watch mode: re-read the saved ledger and refresh every 2s, pruning the
/// saved ledger on the retention interval.
async fn run_watch(app: &App) -> anyhow::Result<()> {
    let mut retention = tokio::time::interval(app.config.retention.interval());
    retention.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut refresh = tokio::time::interval(Duration::from_secs(2));
    refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = retention.tick() => {
                let removed = app.sweep_expired()?;
                if removed > 0 {
                    info!(removed, "Retention sweep removed expired usage records");
                }
            }
            _ = refresh.tick() => {
                app.reload_ledger()?;
                // Clear screen
                print!("\x1b[2J\x1b[H");
                run_table(app)?;
                println!("  (refreshing every 2s, Ctrl+C to exit)");
            }
        }
    }
}
