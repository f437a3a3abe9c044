//! Configuration types for the validator

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::PlanningError;

/// Validator configuration (validator.json / validator.yaml)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidatorConfig {
    /// Worker threads used to search linearizations of a partial-order plan
    pub workers: usize,

    /// Treat a problem naming another domain as a fatal error
    pub strict_domain_name: bool,

    /// Skip the checker capability check
    pub skip_checks: bool,

    /// Fail instead of warn when the checker lacks a needed capability
    pub error_on_failed_checks: bool,

    /// Parent directory for request-scoped artifacts (system temp dir if unset)
    pub artifact_dir: Option<PathBuf>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            strict_domain_name: false,
            skip_checks: false,
            error_on_failed_checks: false,
            artifact_dir: None,
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from a JSON or YAML file, chosen by extension
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            _ => serde_json::from_str(&content)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the search cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.workers == 0 {
            return Err(PlanningError::Config("workers must be at least 1".to_string()));
        }
        Ok(())
    }
}
