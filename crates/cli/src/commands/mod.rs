//! CLI Commands

pub mod convert;
pub mod inspect;
pub mod validate;

pub use convert::ConvertCommand;
pub use inspect::InspectCommand;
pub use validate::ValidateCommand;

use anyhow::Context;
use pddl::{ParseOptions, PlanningTask};
use std::path::Path;

/// Read a text file, naming it in the error
pub(crate) fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Parse an MA-PDDL domain/problem pair from disk
pub(crate) fn load_task(domain: &Path, problem: &Path, strict: bool) -> anyhow::Result<PlanningTask> {
    let options = ParseOptions {
        strict_domain_name: strict,
    };
    let task = PlanningTask::parse(&read_text(domain)?, &read_text(problem)?, options)
        .with_context(|| format!("failed to parse {} / {}", domain.display(), problem.display()))?;
    Ok(task)
}
