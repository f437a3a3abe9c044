//! mapv convert command

use clap::Args;
use console::style;
use pddl::ClassicalSerializer;
use std::path::PathBuf;
use tracing::info;

use super::load_task;

#[derive(Debug, Args)]
pub struct ConvertCommand {
    /// MA-PDDL domain file
    #[arg(short, long)]
    pub domain: PathBuf,

    /// MA-PDDL problem file
    #[arg(short, long)]
    pub problem: PathBuf,

    /// Directory for the classical files
    #[arg(short, long, default_value = "centralized")]
    pub out_dir: PathBuf,

    /// Fail when the problem names another domain
    #[arg(long)]
    pub strict: bool,
}

impl ConvertCommand {
    pub fn run(&self) -> anyhow::Result<()> {
        let paths = self.convert()?;
        for path in &paths {
            println!("{} {}", style("✓").green(), path.display());
        }
        Ok(())
    }

    /// Write the classical domain and problem, returning their paths
    pub fn convert(&self) -> anyhow::Result<Vec<PathBuf>> {
        let task = load_task(&self.domain, &self.problem, self.strict)?;
        let domain_text = ClassicalSerializer::domain_text(&task.domain);
        let problem_text = ClassicalSerializer::problem_text(&task.domain, &task.problem)?;

        std::fs::create_dir_all(&self.out_dir)?;
        let domain_path = self.out_dir.join(format!("{}_domain.pddl", task.domain.name));
        let problem_path = self.out_dir.join(format!("{}_problem.pddl", task.problem.name));
        std::fs::write(&domain_path, domain_text)?;
        std::fs::write(&problem_path, problem_text)?;

        info!(
            domain = %domain_path.display(),
            problem = %problem_path.display(),
            "Wrote classical PDDL"
        );
        Ok(vec![domain_path, problem_path])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::write_robot_files;
    use pddl::{ParseOptions, PlanningTask};
    use tempfile::TempDir;

    #[test]
    fn test_convert_writes_classical_files() {
        let dir = TempDir::new().unwrap();
        let (domain, problem) = write_robot_files(dir.path());
        let command = ConvertCommand {
            domain,
            problem,
            out_dir: dir.path().join("centralized"),
            strict: false,
        };

        let paths = command.convert().unwrap();
        assert_eq!(paths[0].file_name().unwrap(), "robots_domain.pddl");
        assert_eq!(paths[1].file_name().unwrap(), "move-r1_problem.pddl");

        let domain_text = std::fs::read_to_string(&paths[0]).unwrap();
        assert!(!domain_text.contains(":agent"));
        assert!(!domain_text.contains("multi-agent"));

        let task = PlanningTask::parse(
            &domain_text,
            &std::fs::read_to_string(&paths[1]).unwrap(),
            ParseOptions {
                strict_domain_name: true,
            },
        )
        .unwrap();
        assert_eq!(task.action("move_r1").unwrap().parameters.len(), 3);
    }

    #[test]
    fn test_missing_input_fails() {
        let dir = TempDir::new().unwrap();
        let command = ConvertCommand {
            domain: dir.path().join("missing.pddl"),
            problem: dir.path().join("missing.pddl"),
            out_dir: dir.path().join("out"),
            strict: false,
        };
        let err = command.convert().unwrap_err();
        assert!(err.to_string().contains("failed to read"));
        assert!(!dir.path().join("out").exists());
    }
}
