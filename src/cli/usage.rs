//! CLI commands: `modelgate track` and `modelgate budget`

use crate::app::App;
use anyhow::Context;
use modelgate_llm::BudgetPeriod;

/// Record realized usage and save the ledger.
pub fn track(
    app: &App,
    model: &str,
    input_tokens: u32,
    output_tokens: u32,
    task_type: Option<&str>,
) -> anyhow::Result<()> {
    let record = app
        .router
        .track_usage(model, input_tokens, output_tokens, task_type);
    app.save()?;

    let status = app.router.get_budget_status();
    println!(
        "Recorded {} ({} in / {} out): ${:.6}",
        record.model, record.input_tokens, record.output_tokens, record.cost
    );
    println!(
        "Budget: ${:.4} of ${:.2} used ({:.1}%)",
        status.used, status.limit, status.percent_used
    );
    if status.is_exceeded() {
        println!("Budget exceeded: requests now route to the zero-cost fallback");
    }
    Ok(())
}

/// Replace the budget and save.
pub fn budget(app: &App, limit: f64, period: BudgetPeriod) -> anyhow::Result<()> {
    app.router
        .update_budget(limit, period)
        .context("Failed to update budget")?;
    app.save()?;

    let status = app.router.get_budget_status();
    println!("Budget set to ${limit:.2} per {period}");
    println!(
        "Current {period}: ${:.4} used ({:.1}%)",
        status.used, status.percent_used
    );
    Ok(())
}
