//! CLI commands: `modelgate select` and `modelgate estimate`

use crate::app::App;
use modelgate_llm::{Complexity, TaskContext};

/// Task description collected from `select` flags
#[derive(Debug)]
pub struct SelectArgs {
    pub task_type: String,
    pub prompt: String,
    pub complexity: Option<Complexity>,
    pub tokens: Option<u32>,
    pub reasoning: bool,
    pub speed: bool,
}

impl SelectArgs {
    fn context(&self) -> TaskContext {
        let mut context = TaskContext::new(self.task_type.clone(), self.prompt.clone());
        context.estimated_complexity = self.complexity;
        context.estimated_tokens = self.tokens;
        context.requires_reasoning = self.reasoning;
        context.requires_speed = self.speed;
        context
    }
}

/// Run the decision ladder and print the choice. Records nothing.
pub fn select(app: &App, args: SelectArgs, json: bool) -> anyhow::Result<()> {
    let context = args.context();
    let decision = app
        .router
        .select_model_explained(&args.task_type, &context);

    if json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
        return Ok(());
    }

    let model = &decision.model;
    println!();
    println!("  Model:          {}", model.model);
    println!("  Reason:         {}", decision.reason);
    println!("  Estimated cost: ${:.6}", decision.estimated_cost);
    println!("  Max tokens:     {}", model.max_tokens);
    if let Some(temperature) = model.temperature {
        println!("  Temperature:    {temperature}");
    }
    if !model.capabilities.is_empty() {
        let capabilities: Vec<&str> = model.capabilities.iter().map(String::as_str).collect();
        println!("  Capabilities:   {}", capabilities.join(", "));
    }
    println!();
    Ok(())
}

/// Price an estimated token count.
pub fn estimate(app: &App, model: &str, tokens: u32) -> anyhow::Result<()> {
    let cost = app.router.estimate_cost(model, tokens);
    let status = app.router.get_budget_status();
    let affordable = if status.can_afford(cost) {
        "fits"
    } else {
        "exceeds"
    };

    println!(
        "{model}: ~${cost:.6} for {tokens} tokens ({affordable} remaining ${:.4})",
        status.remaining
    );
    Ok(())
}
