//! Multi-agent plans and their JSON document form

use serde::{Deserialize, Serialize};
use shared::{PlanningError, Result};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::path::Path;

use crate::linearize::Linearizations;

/// One agent performing one action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOccurrence {
    pub action: String,
    pub agent: String,
    /// Arguments after the agent
    #[serde(default, rename = "args")]
    pub arguments: Vec<String>,
}

impl ActionOccurrence {
    pub fn new<I, S>(action: impl Into<String>, agent: impl Into<String>, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            action: action.into(),
            agent: agent.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for ActionOccurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}({})", self.agent, self.action, self.arguments.join(", "))
    }
}

/// Totally ordered plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequentialPlan {
    pub steps: Vec<ActionOccurrence>,
}

impl SequentialPlan {
    pub fn new(steps: Vec<ActionOccurrence>) -> Self {
        Self { steps }
    }
}

/// Steps plus "before" constraints forming a DAG
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialOrderPlan {
    steps: Vec<ActionOccurrence>,
    orderings: Vec<(usize, usize)>,
    /// step -> steps that must come after it
    successors: Vec<Vec<usize>>,
}

impl PartialOrderPlan {
    /// Build a plan from steps and `(before, after)` index pairs.
    ///
    /// Fails with `MalformedPlan` when a pair points outside the steps or the
    /// pairs form a cycle.
    pub fn new(steps: Vec<ActionOccurrence>, orderings: Vec<(usize, usize)>) -> Result<Self> {
        let n = steps.len();
        let mut successors = vec![Vec::new(); n];
        let mut in_degree = vec![0usize; n];

        for &(before, after) in &orderings {
            if before >= n || after >= n {
                return Err(PlanningError::MalformedPlan(format!(
                    "ordering ({}, {}) refers to a step outside 0..{}",
                    before, after, n
                )));
            }
            successors[before].push(after);
            in_degree[after] += 1;
        }

        let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut visited = 0usize;
        while let Some(step) = queue.pop_front() {
            visited += 1;
            for &next in &successors[step] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    queue.push_back(next);
                }
            }
        }
        if visited != n {
            return Err(PlanningError::MalformedPlan(
                "orderings contain a cycle".to_string(),
            ));
        }

        Ok(Self {
            steps,
            orderings,
            successors,
        })
    }

    pub fn steps(&self) -> &[ActionOccurrence] {
        &self.steps
    }

    pub fn orderings(&self) -> &[(usize, usize)] {
        &self.orderings
    }

    /// Lazily enumerate every topological order of the steps
    pub fn linearizations(&self) -> Linearizations<'_> {
        Linearizations::new(&self.successors)
    }
}

/// Plan accepted by the validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Sequential(SequentialPlan),
    PartialOrder(PartialOrderPlan),
}

impl Plan {
    pub fn steps(&self) -> &[ActionOccurrence] {
        match self {
            Plan::Sequential(plan) => &plan.steps,
            Plan::PartialOrder(plan) => plan.steps(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Plan::Sequential(_) => "sequential",
            Plan::PartialOrder(_) => "partial_order",
        }
    }
}

impl From<SequentialPlan> for Plan {
    fn from(plan: SequentialPlan) -> Self {
        Plan::Sequential(plan)
    }
}

impl From<PartialOrderPlan> for Plan {
    fn from(plan: PartialOrderPlan) -> Self {
        Plan::PartialOrder(plan)
    }
}

/// Step entry of a plan document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub occurrence: ActionOccurrence,
}

/// Plan file as written by users and tools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanDocument {
    Sequential {
        steps: Vec<PlanStep>,
    },
    PartialOrder {
        steps: Vec<PlanStep>,
        /// `[before_id, after_id]`
        #[serde(default)]
        orderings: Vec<(String, String)>,
    },
}

impl PlanDocument {
    /// Load a plan document from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Resolve step ids and check the orderings
    pub fn into_plan(self) -> Result<Plan> {
        match self {
            PlanDocument::Sequential { steps } => Ok(SequentialPlan::new(
                steps.into_iter().map(|step| step.occurrence).collect(),
            )
            .into()),
            PlanDocument::PartialOrder { steps, orderings } => {
                let mut index = BTreeMap::new();
                for (i, step) in steps.iter().enumerate() {
                    let id = step.id.as_deref().ok_or_else(|| {
                        PlanningError::MalformedPlan(format!(
                            "step {} ({}) of a partial-order plan has no id",
                            i, step.occurrence
                        ))
                    })?;
                    if index.insert(id.to_string(), i).is_some() {
                        return Err(PlanningError::MalformedPlan(format!(
                            "step id '{}' used twice",
                            id
                        )));
                    }
                }
                let lookup = |id: &str| {
                    index.get(id).copied().ok_or_else(|| {
                        PlanningError::MalformedPlan(format!("ordering refers to unknown step '{}'", id))
                    })
                };
                let pairs = orderings
                    .iter()
                    .map(|(before, after)| Ok((lookup(before.as_str())?, lookup(after.as_str())?)))
                    .collect::<Result<Vec<_>>>()?;

                let occurrences = steps.into_iter().map(|step| step.occurrence).collect();
                Ok(PartialOrderPlan::new(occurrences, pairs)?.into())
            }
        }
    }
}
