//! Sequential plan checkers

use pddl::{Action, Atom, Capabilities, Effect, Literal, PlanningTask, TOTAL_COST};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::remapper::GroundAction;

/// Verdict of a checker on one sequential plan
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    Valid {
        /// Accumulated `total-cost`
        cost: f64,
    },
    Invalid {
        /// Index of the failing step, `None` when the goal is not reached
        step: Option<usize>,
        reason: String,
    },
}

impl CheckOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, CheckOutcome::Valid { .. })
    }

    fn invalid(step: Option<usize>, reason: impl Into<String>) -> Self {
        CheckOutcome::Invalid {
            step,
            reason: reason.into(),
        }
    }
}

/// Checks a ground sequential plan against a classical task.
///
/// Implementations are shared by the linearization workers.
pub trait SequentialPlanChecker: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the checker can decide tasks using these features
    fn supports(&self, capabilities: &Capabilities) -> bool;

    fn check(&self, task: &PlanningTask, plan: &[GroundAction]) -> CheckOutcome;
}

/// Forward simulation for STRIPS with negative conditions, equality and
/// action costs
#[derive(Debug, Clone, Copy, Default)]
pub struct StripsChecker;

impl StripsChecker {
    pub fn new() -> Self {
        Self
    }
}

/// Parameter name -> object for one ground step
struct Binding<'a> {
    values: HashMap<&'a str, &'a str>,
}

impl<'a> Binding<'a> {
    fn ground(&self, atom: &Atom) -> Result<Atom, String> {
        let args = atom
            .args
            .iter()
            .map(|arg| {
                if arg.starts_with('?') {
                    self.values
                        .get(arg.as_str())
                        .map(|value| value.to_string())
                        .ok_or_else(|| format!("unbound variable {} in {}", arg, atom))
                } else {
                    Ok(arg.clone())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Atom::new(atom.name.clone(), args))
    }
}

fn holds(state: &BTreeSet<Atom>, literal: &Literal, ground: &Atom) -> bool {
    let positive = if literal.atom.name == "=" {
        ground.args.len() == 2 && ground.args[0] == ground.args[1]
    } else {
        state.contains(ground)
    };
    positive != literal.negated
}

fn bind<'a>(
    task: &PlanningTask,
    action: &'a Action,
    step: &'a GroundAction,
) -> Result<Binding<'a>, String> {
    if action.parameters.len() != step.arguments.len() {
        return Err(format!(
            "{} takes {} arguments, {} given",
            action.name,
            action.parameters.len(),
            step.arguments.len()
        ));
    }
    let mut values = HashMap::new();
    for (param, arg) in action.parameters.iter().zip(&step.arguments) {
        let ty = task
            .object_type(arg)
            .ok_or_else(|| format!("unknown object {} in {}", arg, step))?;
        if !task.is_subtype(ty, &param.ty) {
            return Err(format!(
                "{} is a {} but {} of {} must be a {}",
                arg, ty, param.name, action.name, param.ty
            ));
        }
        values.insert(param.name.as_str(), arg.as_str());
    }
    Ok(Binding { values })
}

impl SequentialPlanChecker for StripsChecker {
    fn name(&self) -> &str {
        "StripsChecker"
    }

    fn supports(&self, capabilities: &Capabilities) -> bool {
        !capabilities.numeric_fluents && !capabilities.durations
    }

    fn check(&self, task: &PlanningTask, plan: &[GroundAction]) -> CheckOutcome {
        let mut state: BTreeSet<Atom> = task.problem.init.iter().cloned().collect();
        let mut cost = task
            .problem
            .numeric_init
            .iter()
            .find(|f| f.name == TOTAL_COST && f.args.is_empty())
            .map(|f| f.value)
            .unwrap_or(0.0);

        for (i, step) in plan.iter().enumerate() {
            let Some(action) = task.action(&step.action) else {
                return CheckOutcome::invalid(Some(i), format!("unknown action {}", step.action));
            };
            let binding = match bind(task, action, step) {
                Ok(binding) => binding,
                Err(reason) => return CheckOutcome::invalid(Some(i), reason),
            };

            for literal in &action.precondition {
                let ground = match binding.ground(&literal.atom) {
                    Ok(ground) => ground,
                    Err(reason) => return CheckOutcome::invalid(Some(i), reason),
                };
                if !holds(&state, literal, &ground) {
                    return CheckOutcome::invalid(
                        Some(i),
                        format!("precondition {} of {} does not hold", literal, step),
                    );
                }
            }

            let mut deletes = Vec::new();
            let mut adds = Vec::new();
            for effect in &action.effect {
                match effect {
                    Effect::Literal(literal) => match binding.ground(&literal.atom) {
                        Ok(ground) if literal.negated => deletes.push(ground),
                        Ok(ground) => adds.push(ground),
                        Err(reason) => return CheckOutcome::invalid(Some(i), reason),
                    },
                    Effect::IncreaseCost(amount) => cost += amount,
                }
            }
            for atom in &deletes {
                state.remove(atom);
            }
            state.extend(adds);
        }

        for literal in &task.problem.goal {
            if !holds(&state, literal, &literal.atom) {
                debug!(goal = %literal, "Goal not reached");
                return CheckOutcome::invalid(None, format!("goal {} is not reached", literal));
            }
        }
        CheckOutcome::Valid { cost }
    }
}
