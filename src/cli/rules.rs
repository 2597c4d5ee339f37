//! Routing rule CLI commands
//!
//! `modelgate rules list`: show rules in evaluation order
//! `modelgate rules add`: add or replace a rule
//! `modelgate rules remove`: delete a rule

use super::RulesCommands;
use crate::app::App;
use anyhow::{Context, Result};
use modelgate_llm::{RoutingRule, RuleCondition};

/// Run a rules subcommand.
pub fn run(app: &App, cmd: RulesCommands) -> Result<()> {
    match cmd {
        RulesCommands::List { json } => list(app, json),
        RulesCommands::Add {
            id,
            task_type,
            preferred_model,
            fallback,
            condition,
        } => {
            let mut rule = RoutingRule::new(id, task_type, preferred_model);
            rule.fallback_model = fallback;
            if let Some(condition) = condition {
                rule.condition = Some(parse_condition(&condition)?);
            }
            add(app, rule)
        }
        RulesCommands::Remove { id } => remove(app, &id),
    }
}

fn parse_condition(json: &str) -> Result<RuleCondition> {
    serde_json::from_str(json).context("Invalid condition JSON")
}

fn list(app: &App, json: bool) -> Result<()> {
    let config = app.router.config();

    if json {
        println!("{}", serde_json::to_string_pretty(&config.rules)?);
        return Ok(());
    }

    println!();
    println!(
        "  {:<20} {:<14} {:<28} {}",
        "Id", "Task Type", "Preferred", "Fallback"
    );
    println!("  {}", "-".repeat(90));

    if config.rules.is_empty() {
        println!("  (no routing rules; every task uses heuristics)");
    }
    for rule in config.rules.iter() {
        println!(
            "  {:<20} {:<14} {:<28} {}",
            rule.id,
            rule.task_type,
            rule.preferred_model,
            rule.fallback_model.as_deref().unwrap_or("-")
        );
        if let Some(condition) = &rule.condition {
            println!("  {:<20} when {}", "", serde_json::to_string(condition)?);
        }
    }
    println!();
    println!("  Zero-cost fallback: {}", config.fallback_model);
    println!();
    Ok(())
}

fn add(app: &App, rule: RoutingRule) -> Result<()> {
    let id = rule.id.clone();
    app.router
        .add_routing_rule(rule)
        .with_context(|| format!("Failed to add rule '{id}'"))?;
    app.save()?;
    println!("Rule '{id}' saved");
    Ok(())
}

fn remove(app: &App, id: &str) -> Result<()> {
    if !app.router.remove_routing_rule(id) {
        anyhow::bail!("No rule with id '{id}'");
    }
    app.save()?;
    println!("Rule '{id}' removed");
    Ok(())
}
