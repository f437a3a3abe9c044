//! PlanRemapper - binds multi-agent action occurrences to classical actions
//!
//! The classical counterpart of agent `a` performing `act` is the action
//! `act_a`, whose first parameter is the agent. The remaining arguments are
//! bound positionally after it.

use pddl::PlanningTask;
use serde::Serialize;
use shared::{
    ActionLookupError, ArityMismatchError, ObjectLookupError, ParameterTypeMismatchError, Result,
};
use std::fmt;
use tracing::trace;

use crate::plan::ActionOccurrence;

/// Classical action applied to objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroundAction {
    pub action: String,
    pub arguments: Vec<String>,
}

impl fmt::Display for GroundAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.action)?;
        for arg in &self.arguments {
            write!(f, " {}", arg)?;
        }
        f.write_str(")")
    }
}

/// Remaps occurrences against one classical task
#[derive(Debug, Clone, Copy)]
pub struct PlanRemapper<'t> {
    task: &'t PlanningTask,
}

impl<'t> PlanRemapper<'t> {
    pub fn new(task: &'t PlanningTask) -> Self {
        Self { task }
    }

    /// Classical action name for an occurrence
    pub fn classical_name(occurrence: &ActionOccurrence) -> String {
        format!("{}_{}", occurrence.action, occurrence.agent)
    }

    pub fn remap(&self, occurrence: &ActionOccurrence) -> Result<GroundAction> {
        let name = Self::classical_name(occurrence);
        let action = self.task.action(&name).ok_or_else(|| ActionLookupError {
            action: name.clone(),
            available: self
                .task
                .domain
                .actions
                .iter()
                .map(|a| a.name.clone())
                .collect(),
        })?;

        let bound = 1 + occurrence.arguments.len();
        let agent_param = action.parameters.first().ok_or_else(|| ArityMismatchError {
            action: name.clone(),
            expected: 0,
            found: bound,
        })?;

        let agent_type = self
            .task
            .object_type(&occurrence.agent)
            .ok_or_else(|| ObjectLookupError {
                object: occurrence.agent.clone(),
                context: format!("agent of action '{}'", name),
            })?;
        if !self.task.is_subtype(agent_type, &agent_param.ty) {
            return Err(ParameterTypeMismatchError {
                action: name,
                object: occurrence.agent.clone(),
                expected: agent_param.ty.clone(),
                found: agent_type.to_string(),
            }
            .into());
        }

        if action.parameters.len() != bound {
            return Err(ArityMismatchError {
                action: name,
                expected: action.parameters.len(),
                found: bound,
            }
            .into());
        }

        let mut arguments = Vec::with_capacity(bound);
        arguments.push(occurrence.agent.clone());
        arguments.extend(occurrence.arguments.iter().cloned());
        trace!(occurrence = %occurrence, action = %name, "Remapped occurrence");
        Ok(GroundAction {
            action: name,
            arguments,
        })
    }

    /// Remap every step, failing on the first that cannot be bound
    pub fn remap_all(&self, steps: &[ActionOccurrence]) -> Result<Vec<GroundAction>> {
        steps.iter().map(|step| self.remap(step)).collect()
    }
}
