//! Ledger data CLI commands
//!
//! `modelgate export`: write the ledger snapshot to stdout or a file
//! `modelgate import`: replace the ledger from a snapshot file
//! `modelgate clear`: delete all usage records
//! `modelgate prune`: drop records past the retention window

use crate::app::App;
use anyhow::{Context, Result};
use std::path::Path;

fn confirm(prompt: &str) -> bool {
    use std::io::{self, Write};
    print!("{prompt} [y/N] ");
    io::stdout().flush().ok();
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_ok() {
        matches!(input.trim(), "y" | "Y" | "yes" | "YES")
    } else {
        false
    }
}

// ── Export / Import ──────────────────────────────────────────────────

pub fn export(app: &App, output: Option<&Path>) -> Result<()> {
    let snapshot = app
        .router
        .export_snapshot()
        .context("Failed to export ledger")?;

    match output {
        Some(path) => {
            std::fs::write(path, snapshot)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "Exported {} records to {}",
                app.router.ledger().record_count(),
                path.display()
            );
        }
        None => println!("{snapshot}"),
    }
    Ok(())
}

pub fn import(app: &App, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    app.router
        .import_snapshot(&json)
        .with_context(|| format!("Rejected snapshot {}", file.display()))?;
    app.save()?;

    let budget = app.router.ledger().budget();
    println!(
        "Imported {} records (budget ${:.2} per {})",
        app.router.ledger().record_count(),
        budget.limit,
        budget.period
    );
    Ok(())
}

// ── Clear / Prune ────────────────────────────────────────────────────

pub fn clear(app: &App, force: bool) -> Result<()> {
    let count = app.router.ledger().record_count();
    if count == 0 {
        println!("No usage records to clear.");
        return Ok(());
    }

    if !force && !confirm(&format!("Delete {count} usage records?")) {
        println!("Cancelled.");
        return Ok(());
    }

    app.router.ledger().clear_records();
    app.save()?;
    println!("Cleared {count} usage records.");
    Ok(())
}

pub fn prune(app: &App) -> Result<()> {
    let removed = app.sweep_expired()?;
    println!("Removed {removed} expired records.");
    Ok(())
}
