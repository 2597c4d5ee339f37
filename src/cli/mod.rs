//! CLI module for Modelgate
//!
//! Provides commands:
//! - `status`: Budget status and usage breakdown
//! - `select` / `estimate`: Run the routing ladder or price an estimate
//! - `track` / `budget`: Record usage or change the budget
//! - `rules`: Inspect and edit routing rules
//! - `export` / `import` / `clear` / `prune`: Ledger data management

use crate::app::App;
use clap::{Parser, Subcommand};
use modelgate_llm::{BudgetPeriod, Complexity};
use std::path::PathBuf;

pub mod data;
pub mod route;
pub mod rules;
pub mod status;
pub mod usage;

/// Modelgate budget-aware model router CLI
#[derive(Parser, Debug)]
#[command(name = "modelgate")]
#[command(about = "Budget-aware model routing")]
#[command(version)]
pub struct Cli {
    /// Extra configuration file layered over the defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show budget status and usage breakdown
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Refresh continuously
        #[arg(long, short)]
        watch: bool,
    },
    /// Choose a model for a task (records nothing)
    Select {
        /// Task type, matched against routing rules
        task_type: String,
        /// Prompt text, used by prompt conditions
        #[arg(long, default_value = "")]
        prompt: String,
        /// Estimated complexity (low, medium, high)
        #[arg(long)]
        complexity: Option<Complexity>,
        /// Estimated total tokens
        #[arg(long)]
        tokens: Option<u32>,
        /// Task needs strong reasoning
        #[arg(long)]
        reasoning: bool,
        /// Task is latency sensitive
        #[arg(long)]
        speed: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Price an estimated token count on a model
    Estimate {
        /// Model identifier
        model: String,
        /// Estimated total tokens (split 70/30 input/output)
        tokens: u32,
    },
    /// Record realized usage
    Track {
        /// Model identifier
        model: String,
        /// Input tokens
        input_tokens: u32,
        /// Output tokens
        output_tokens: u32,
        /// Task type label
        #[arg(long)]
        task_type: Option<String>,
    },
    /// Set the budget limit and period
    Budget {
        /// Limit in USD
        limit: f64,
        /// Period (day, week, month)
        period: BudgetPeriod,
    },
    /// Manage routing rules
    #[command(subcommand)]
    Rules(RulesCommands),
    /// Export the ledger snapshot
    Export {
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Replace the ledger from a snapshot file
    Import {
        /// Snapshot file
        file: PathBuf,
    },
    /// Delete all usage records
    Clear {
        /// Skip confirmation
        #[arg(long, short)]
        force: bool,
    },
    /// Remove records past the retention window
    Prune,
}

#[derive(Subcommand, Debug)]
pub enum RulesCommands {
    /// List rules in evaluation order
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add or replace a rule
    Add {
        /// Rule id
        id: String,
        /// Task type to match
        task_type: String,
        /// Preferred model
        preferred_model: String,
        /// Fallback model when the preferred one is unaffordable
        #[arg(long)]
        fallback: Option<String>,
        /// Condition as JSON, e.g. '{"kind":"min_tokens","tokens":4000}'
        #[arg(long)]
        condition: Option<String>,
    },
    /// Remove a rule
    Remove {
        /// Rule id
        id: String,
    },
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        cmd.print_help()?;
        println!();
        return Ok(());
    };

    let app = App::load(cli.config.as_deref())?;

    match command {
        Commands::Status { json, watch } => status::run(&app, json, watch).await,
        Commands::Select {
            task_type,
            prompt,
            complexity,
            tokens,
            reasoning,
            speed,
            json,
        } => {
            let request = route::SelectArgs {
                task_type,
                prompt,
                complexity,
                tokens,
                reasoning,
                speed,
            };
            route::select(&app, request, json)
        }
        Commands::Estimate { model, tokens } => route::estimate(&app, &model, tokens),
        Commands::Track {
            model,
            input_tokens,
            output_tokens,
            task_type,
        } => usage::track(&app, &model, input_tokens, output_tokens, task_type.as_deref()),
        Commands::Budget { limit, period } => usage::budget(&app, limit, period),
        Commands::Rules(cmd) => rules::run(&app, cmd),
        Commands::Export { output } => data::export(&app, output.as_deref()),
        Commands::Import { file } => data::import(&app, &file),
        Commands::Clear { force } => data::clear(&app, force),
        Commands::Prune => data::prune(&app),
    }
}
