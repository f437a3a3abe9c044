//! PlanningTask - a parsed domain/problem pair and what it needs from a checker

use serde::Serialize;
use shared::Result;
use std::collections::BTreeSet;

use crate::domain_parser::DomainParser;
use crate::model::{Action, Domain, Effect, Literal, Problem, DEFAULT_DURATION, TOTAL_COST};
use crate::problem_parser::ProblemParser;
use crate::types::ROOT_TYPE;

/// Options that change how strictly text is read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Treat a problem naming another domain as an error
    pub strict_domain_name: bool,
}

/// Language features a task uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// Some type sits below a type other than `object`
    pub hierarchical_typing: bool,
    pub negative_conditions: bool,
    pub equality: bool,
    pub action_costs: bool,
    /// Numeric functions besides `total-cost`
    pub numeric_fluents: bool,
    /// Actions with a non-default duration
    pub durations: bool,
}

impl Capabilities {
    /// Features used by either side
    pub fn union(self, other: Self) -> Self {
        Self {
            hierarchical_typing: self.hierarchical_typing || other.hierarchical_typing,
            negative_conditions: self.negative_conditions || other.negative_conditions,
            equality: self.equality || other.equality,
            action_costs: self.action_costs || other.action_costs,
            numeric_fluents: self.numeric_fluents || other.numeric_fluents,
            durations: self.durations || other.durations,
        }
    }
}

/// Domain plus one of its problems
#[derive(Debug, Clone, PartialEq)]
pub struct PlanningTask {
    pub domain: Domain,
    pub problem: Problem,
}

impl PlanningTask {
    pub fn new(domain: Domain, problem: Problem) -> Self {
        Self { domain, problem }
    }

    /// Parse domain and problem text
    pub fn parse(domain_text: &str, problem_text: &str, options: ParseOptions) -> Result<Self> {
        let domain = DomainParser::parse(domain_text)?;
        let problem = ProblemParser::new(&domain)
            .strict_domain_name(options.strict_domain_name)
            .parse(problem_text)?;
        Ok(Self { domain, problem })
    }

    /// Objects and constants whose type is, or descends from, an agent type
    pub fn agents(&self) -> BTreeSet<String> {
        let tables = [&self.problem.objects, &self.domain.constants];
        self.domain
            .agent_types
            .iter()
            .flat_map(|ty| self.domain.types.objects_of_type(ty, &tables))
            .collect()
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.domain.action(name)
    }

    /// Declared type of a problem object or domain constant
    pub fn object_type(&self, name: &str) -> Option<&str> {
        self.problem
            .objects
            .type_of(name)
            .or_else(|| self.domain.constants.type_of(name))
    }

    pub fn is_subtype(&self, ty: &str, ancestor: &str) -> bool {
        self.domain.types.is_subtype(ty, ancestor)
    }

    pub fn capabilities(&self) -> Capabilities {
        let domain = &self.domain;
        let conditions = || {
            domain
                .actions
                .iter()
                .flat_map(|a| a.precondition.iter())
                .chain(self.problem.goal.iter())
        };
        let is_equality = |literal: &Literal| literal.atom.name == "=";

        Capabilities {
            hierarchical_typing: domain
                .types
                .known_types()
                .into_iter()
                .any(|ty| domain.types.parent(ty).is_some_and(|p| p != ROOT_TYPE)),
            negative_conditions: conditions().any(|l| l.negated && !is_equality(l)),
            equality: conditions().any(is_equality),
            action_costs: self.problem.metric
                || domain
                    .actions
                    .iter()
                    .flat_map(|a| a.effect.iter())
                    .any(|e| matches!(e, Effect::IncreaseCost(_))),
            numeric_fluents: domain.functions.iter().any(|f| f.name != TOTAL_COST)
                || self.problem.numeric_init.iter().any(|f| f.name != TOTAL_COST),
            durations: domain.actions.iter().any(|a| a.duration != DEFAULT_DURATION),
        }
    }
}
