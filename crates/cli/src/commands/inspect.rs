//! mapv inspect command

use clap::Args;
use console::style;
use pddl::PlanningTask;
use serde_json::{json, Value};
use std::path::PathBuf;

use super::load_task;

#[derive(Debug, Args)]
pub struct InspectCommand {
    /// MA-PDDL domain file
    #[arg(short, long)]
    pub domain: PathBuf,

    /// MA-PDDL problem file
    #[arg(short, long)]
    pub problem: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Fail when the problem names another domain
    #[arg(long)]
    pub strict: bool,
}

impl InspectCommand {
    pub fn run(&self) -> anyhow::Result<()> {
        let task = load_task(&self.domain, &self.problem, self.strict)?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary(&task)?)?);
        } else {
            print_summary(&task);
        }
        Ok(())
    }
}

/// Machine-readable overview of a parsed task
pub(crate) fn summary(task: &PlanningTask) -> anyhow::Result<Value> {
    let actions: Vec<Value> = task
        .domain
        .actions
        .iter()
        .map(|action| {
            json!({
                "name": action.name,
                "agentType": action.agent_type,
                "parameters": action.ordinary_parameters().len(),
            })
        })
        .collect();

    Ok(json!({
        "domain": task.domain.name,
        "problem": task.problem.name,
        "requirements": task.domain.requirements,
        "types": task.domain.types.known_types(),
        "predicates": task.domain.predicates.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        "actions": actions,
        "objects": task.problem.objects.len(),
        "agents": task.agents(),
        "goals": task.problem.goal.iter().map(|g| g.to_string()).collect::<Vec<_>>(),
        "capabilities": serde_json::to_value(task.capabilities())?,
    }))
}

fn print_summary(task: &PlanningTask) {
    println!(
        "{} {} / {}",
        style("Task").bold(),
        style(&task.domain.name).cyan(),
        style(&task.problem.name).cyan()
    );
    let requirements: Vec<&str> = task.domain.requirements.iter().map(String::as_str).collect();
    println!("  requirements: {}", requirements.join(" "));

    let agents: Vec<String> = task.agents().into_iter().collect();
    println!("  agents ({}): {}", agents.len(), agents.join(", "));
    println!("  objects: {}", task.problem.objects.len());

    println!("  actions:");
    for action in &task.domain.actions {
        let agent = action.agent_type.as_deref().unwrap_or("-");
        println!(
            "    {} [{}] {} parameter(s)",
            style(&action.name).green(),
            agent,
            action.ordinary_parameters().len()
        );
    }

    println!("  goals:");
    for goal in &task.problem.goal {
        println!("    {}", goal);
    }
}
