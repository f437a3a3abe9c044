//! # MA Plan Validator
//!
//! Validates multi-agent plans by translating the problem to classical PDDL,
//! remapping each plan step onto its per-agent classical action, and replaying
//! execution orders against a sequential plan checker.

pub mod checker;
pub mod linearize;
pub mod orchestrator;
pub mod plan;
pub mod remapper;
pub mod session;

#[cfg(test)]
mod fixtures;

// Re-exports
pub use checker::{CheckOutcome, SequentialPlanChecker, StripsChecker};
pub use linearize::Linearizations;
pub use orchestrator::{
    LogLevel, LogMessage, MaPlanValidator, Translation, ValidationResult, ValidationStatus,
    ENGINE_NAME,
};
pub use plan::{ActionOccurrence, PartialOrderPlan, Plan, PlanDocument, PlanStep, SequentialPlan};
pub use remapper::{GroundAction, PlanRemapper};
pub use session::ArtifactSession;
