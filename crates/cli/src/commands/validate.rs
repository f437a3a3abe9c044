//! mapv validate command

use anyhow::Context;
use clap::Args;
use console::style;
use pddl::RenderedText;
use shared::{PlanningError, ValidatorConfig};
use std::path::PathBuf;
use validator::{LogLevel, MaPlanValidator, PlanDocument, StripsChecker, ValidationResult};

use super::read_text;

#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// MA-PDDL domain file whose actions are already named per agent
    /// (`move_r1`, each with `:agent`), as written by the unfactored writer
    #[arg(short, long)]
    pub domain: PathBuf,

    /// MA-PDDL problem file
    #[arg(short, long)]
    pub problem: PathBuf,

    /// Plan document (JSON)
    #[arg(long)]
    pub plan: PathBuf,

    /// Validator configuration (JSON or YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the number of linearization workers
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl ValidateCommand {
    /// Returns whether the plan is valid
    pub fn run(&self) -> anyhow::Result<bool> {
        let result = self.validate().inspect_err(|e| {
            if is_remapping_failure(e) {
                eprintln!(
                    "{} {} could not be validated against {}",
                    style("✗").red(),
                    self.plan.display(),
                    self.domain.display()
                );
            }
        })?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print_result(&result);
        }
        Ok(result.is_valid())
    }

    pub fn validate(&self) -> anyhow::Result<ValidationResult> {
        let config = self.load_config()?;
        let writer = RenderedText::new(read_text(&self.domain)?, read_text(&self.problem)?);
        let plan = PlanDocument::from_file(&self.plan)
            .and_then(PlanDocument::into_plan)
            .with_context(|| format!("failed to load plan {}", self.plan.display()))?;

        let validator = MaPlanValidator::new(StripsChecker::new()).with_config(config);
        Ok(validator.validate(&writer, &plan)?)
    }

    fn load_config(&self) -> anyhow::Result<ValidatorConfig> {
        let mut config = match &self.config {
            Some(path) => ValidatorConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => ValidatorConfig::default(),
        };
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        config.validate()?;
        Ok(config)
    }
}

/// The plan names actions, agents or arguments the domain does not have
pub(crate) fn is_remapping_failure(err: &anyhow::Error) -> bool {
    err.downcast_ref::<PlanningError>()
        .is_some_and(PlanningError::is_remapping_failure)
}

fn print_result(result: &ValidationResult) {
    for log in &result.logs {
        let level = match log.level {
            LogLevel::Debug => style("debug").dim(),
            LogLevel::Info => style("info").blue(),
            LogLevel::Warning => style("warning").yellow(),
            LogLevel::Error => style("error").red(),
        };
        println!("[{}] {}", level, log.message);
    }

    if let Some(plan) = &result.accepted_plan {
        println!("\n{}", style("Accepted order:").bold());
        for (i, step) in plan.iter().enumerate() {
            println!("  {:>3}: {}", i, step);
        }
    }

    let verdict = if result.is_valid() {
        style("VALID").green().bold()
    } else {
        style("INVALID").red().bold()
    };
    println!(
        "\n{} ({} via {}, {} order(s) tried)",
        verdict, result.engine, result.checker, result.linearizations_tried
    );
}
