//! Classical reader - re-reads serialized classical PDDL from disk

use shared::Result;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::task::{ParseOptions, PlanningTask};

/// Turns a classical domain/problem file pair into a `PlanningTask`
pub trait ClassicalReader {
    fn read(&self, domain_path: &Path, problem_path: &Path) -> Result<PlanningTask>;
}

/// Reader built on this crate's own parsers
#[derive(Debug, Clone, Copy, Default)]
pub struct PddlReader {
    options: ParseOptions,
}

impl PddlReader {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Parse text that is already in memory
    pub fn from_text(&self, domain_text: &str, problem_text: &str) -> Result<PlanningTask> {
        PlanningTask::parse(domain_text, problem_text, self.options)
    }
}

impl ClassicalReader for PddlReader {
    fn read(&self, domain_path: &Path, problem_path: &Path) -> Result<PlanningTask> {
        debug!(domain = %domain_path.display(), problem = %problem_path.display(), "Reading classical task");
        let domain_text = fs::read_to_string(domain_path)?;
        let problem_text = fs::read_to_string(problem_path)?;
        self.from_text(&domain_text, &problem_text)
    }
}
