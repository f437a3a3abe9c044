//! Error types for the MA plan validator

use thiserror::Error;

/// A type name that was used before it was declared
#[derive(Debug, Error)]
#[error("Unknown type '{type_name}' in {context}. Known types: {}", known_types.join(", "))]
pub struct UnknownTypeError {
    pub type_name: String,
    pub context: String,
    pub known_types: Vec<String>,
}

/// Problem file names a different domain than the one parsed
#[derive(Debug, Error)]
#[error("Problem '{problem}' declares domain '{found}' but the domain is '{expected}'")]
pub struct DomainMismatchError {
    pub problem: String,
    pub expected: String,
    pub found: String,
}

/// Construct the classical translation cannot represent
#[derive(Debug, Error)]
#[error("Unsupported construct in {context}: {construct}")]
pub struct UnsupportedError {
    pub construct: String,
    pub context: String,
}

/// Object referenced but never declared as an object or constant
#[derive(Debug, Error)]
#[error("Object '{object}' referenced in {context} is not declared")]
pub struct ObjectLookupError {
    pub object: String,
    pub context: String,
}

/// No classical action matches a multi-agent action occurrence
#[derive(Debug, Error)]
#[error("No matching action found for '{action}'. Available actions: {}", available.join(", "))]
pub struct ActionLookupError {
    pub action: String,
    pub available: Vec<String>,
}

/// Agent object does not fit the classical action's first parameter
#[derive(Debug, Error)]
#[error("Type mismatch for agent parameter in action '{action}': object '{object}' is '{found}', expected '{expected}'")]
pub struct ParameterTypeMismatchError {
    pub action: String,
    pub object: String,
    pub expected: String,
    pub found: String,
}

/// Occurrence supplies the wrong number of arguments
#[derive(Debug, Error)]
#[error("Action '{action}' takes {expected} parameters but {found} were bound")]
pub struct ArityMismatchError {
    pub action: String,
    pub expected: usize,
    pub found: usize,
}

/// General planning error type
///
/// Every variant aborts the request it occurs in. An invalid plan is not an
/// error; it is reported through the validation result instead.
#[derive(Debug, Error)]
pub enum PlanningError {
    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error(transparent)]
    UnknownType(#[from] UnknownTypeError),

    #[error(transparent)]
    DomainMismatch(#[from] DomainMismatchError),

    #[error(transparent)]
    Unsupported(#[from] UnsupportedError),

    #[error(transparent)]
    ObjectLookup(#[from] ObjectLookupError),

    #[error(transparent)]
    ActionLookup(#[from] ActionLookupError),

    #[error(transparent)]
    ParameterTypeMismatch(#[from] ParameterTypeMismatchError),

    #[error(transparent)]
    ArityMismatch(#[from] ArityMismatchError),

    #[error("Malformed plan: {0}")]
    MalformedPlan(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl PlanningError {
    /// Shorthand for building a syntax error
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax(message.into())
    }

    /// True for the errors raised while binding plan steps to classical actions
    pub fn is_remapping_failure(&self) -> bool {
        matches!(
            self,
            Self::ActionLookup(_) | Self::ParameterTypeMismatch(_) | Self::ArityMismatch(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PlanningError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type_message_lists_known_types() {
        let err = UnknownTypeError {
            type_name: "truck".to_string(),
            context: "constants".to_string(),
            known_types: vec!["object".to_string(), "robot".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown type 'truck' in constants. Known types: object, robot"
        );
    }

    #[test]
    fn test_remapping_failures_are_classified() {
        let lookup: PlanningError = ActionLookupError {
            action: "move_r2".to_string(),
            available: vec!["move_r1".to_string()],
        }
        .into();
        assert!(lookup.is_remapping_failure());
        assert!(!PlanningError::syntax("bad header").is_remapping_failure());
    }
}
