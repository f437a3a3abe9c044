//! Multi-agent writers - produce the MA-PDDL text a validation starts from
//!
//! `UnfactoredWriter` renders an in-memory `MultiAgentProblem` in the
//! unfactored dialect: one domain for all agents, every action specialised
//! per agent as `<action>_<agent>` with the agent as its `:agent` parameter.
//! `RenderedText` wraps text that already exists.

use shared::Result;
use std::fmt::{self, Write};

use crate::model::{
    Atom, Effect, FunctionSignature, GroundFunction, Literal, ParamList, PredicateSignature,
    TypedParam, MULTI_AGENT_REQUIREMENTS,
};
use crate::serializer::Conjunction;

/// Source of multi-agent domain and problem text
pub trait MultiAgentWriter {
    fn domain_text(&self) -> Result<String>;
    fn problem_text(&self) -> Result<String>;
}

/// Text that has already been written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedText {
    pub domain: String,
    pub problem: String,
}

impl RenderedText {
    pub fn new(domain: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            problem: problem.into(),
        }
    }
}

impl MultiAgentWriter for RenderedText {
    fn domain_text(&self) -> Result<String> {
        Ok(self.domain.clone())
    }

    fn problem_text(&self) -> Result<String> {
        Ok(self.problem.clone())
    }
}

/// Lifted action an agent can perform
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSchema {
    pub name: String,
    /// Variable bound to the performing agent, e.g. `?r`
    pub agent_param: String,
    pub parameters: Vec<TypedParam>,
    pub precondition: Vec<Literal>,
    pub effect: Vec<Effect>,
}

impl ActionSchema {
    pub fn new(name: impl Into<String>, agent_param: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            agent_param: agent_param.into(),
            parameters: Vec::new(),
            precondition: Vec::new(),
            effect: Vec::new(),
        }
    }

    /// Builder: add an ordinary parameter
    pub fn with_parameter(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.parameters.push(TypedParam::new(name, ty));
        self
    }

    /// Builder: add a precondition literal
    pub fn with_precondition(mut self, literal: Literal) -> Self {
        self.precondition.push(literal);
        self
    }

    /// Builder: add an effect
    pub fn with_effect(mut self, effect: impl Into<Effect>) -> Self {
        self.effect.push(effect.into());
        self
    }
}

/// One agent with its type, private fluents and actions
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSpec {
    pub name: String,
    pub agent_type: String,
    pub private_predicates: Vec<PredicateSignature>,
    pub actions: Vec<ActionSchema>,
}

impl AgentSpec {
    pub fn new(name: impl Into<String>, agent_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            agent_type: agent_type.into(),
            private_predicates: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Builder: add a private predicate
    pub fn with_private_predicate(mut self, predicate: PredicateSignature) -> Self {
        self.private_predicates.push(predicate);
        self
    }

    /// Builder: add an action
    pub fn with_action(mut self, action: ActionSchema) -> Self {
        self.actions.push(action);
        self
    }
}

/// In-memory multi-agent problem
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiAgentProblem {
    pub name: String,
    pub domain_name: String,
    /// Flags beyond the multi-agent and typing ones
    pub requirements: Vec<String>,
    /// (child, parent) in declaration order
    pub types: Vec<(String, String)>,
    pub constants: Vec<(String, String)>,
    pub predicates: Vec<PredicateSignature>,
    pub functions: Vec<FunctionSignature>,
    pub agents: Vec<AgentSpec>,
    pub objects: Vec<(String, String)>,
    pub init: Vec<Atom>,
    pub numeric_init: Vec<GroundFunction>,
    pub goal: Vec<Literal>,
    pub metric: bool,
}

impl MultiAgentProblem {
    pub fn new(name: impl Into<String>, domain_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain_name: domain_name.into(),
            ..Self::default()
        }
    }

    /// Builder: add a requirement flag, without the leading ':'
    pub fn with_requirement(mut self, flag: impl Into<String>) -> Self {
        self.requirements.push(flag.into());
        self
    }

    /// Builder: declare a type
    pub fn with_type(mut self, ty: impl Into<String>, parent: impl Into<String>) -> Self {
        self.types.push((ty.into(), parent.into()));
        self
    }

    /// Builder: declare a domain constant
    pub fn with_constant(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.constants.push((name.into(), ty.into()));
        self
    }

    /// Builder: declare a public predicate
    pub fn with_predicate(mut self, predicate: PredicateSignature) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Builder: declare a numeric function
    pub fn with_function(mut self, function: FunctionSignature) -> Self {
        self.functions.push(function);
        self
    }

    /// Builder: add an agent
    pub fn with_agent(mut self, agent: AgentSpec) -> Self {
        self.agents.push(agent);
        self
    }

    /// Builder: add a problem object
    pub fn with_object(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.objects.push((name.into(), ty.into()));
        self
    }

    /// Builder: add an initial fact
    pub fn with_fact(mut self, fact: Atom) -> Self {
        self.init.push(fact);
        self
    }

    /// Builder: add an initial numeric value
    pub fn with_value(mut self, value: GroundFunction) -> Self {
        self.numeric_init.push(value);
        self
    }

    /// Builder: add a goal literal
    pub fn with_goal(mut self, literal: Literal) -> Self {
        self.goal.push(literal);
        self
    }

    /// Builder: minimize total cost
    pub fn with_metric(mut self) -> Self {
        self.metric = true;
        self
    }
}

/// Writes a `MultiAgentProblem` as unfactored MA-PDDL
#[derive(Debug, Clone, Copy)]
pub struct UnfactoredWriter<'a> {
    problem: &'a MultiAgentProblem,
}

impl<'a> UnfactoredWriter<'a> {
    pub fn new(problem: &'a MultiAgentProblem) -> Self {
        Self { problem }
    }

    fn write_domain(&self, out: &mut String) -> fmt::Result {
        let problem = self.problem;
        writeln!(out, "(define (domain {})", problem.domain_name)?;

        out.push_str("\t(:requirements :multi-agent :unfactored-privacy :typing");
        for flag in &problem.requirements {
            let flag = flag.trim_start_matches(':');
            if flag != "typing" && !MULTI_AGENT_REQUIREMENTS.contains(&flag) {
                write!(out, " :{}", flag)?;
            }
        }
        out.push_str(")\n");

        if !problem.types.is_empty() {
            out.push_str("(:types\n");
            for (ty, parent) in &problem.types {
                writeln!(out, "\t{} - {}", ty, parent)?;
            }
            out.push_str(")\n");
        }

        if !problem.constants.is_empty() {
            out.push_str("(:constants\n");
            for (name, ty) in &problem.constants {
                writeln!(out, "\t{} - {}", name, ty)?;
            }
            out.push_str(")\n");
        }

        out.push_str("(:predicates\n");
        for predicate in &problem.predicates {
            writeln!(out, "\t{}", predicate)?;
        }
        for agent in problem.agents.iter().filter(|a| !a.private_predicates.is_empty()) {
            writeln!(out, "\t(:private ?{} - {}", agent.name, agent.agent_type)?;
            for predicate in &agent.private_predicates {
                writeln!(out, "\t\t{}", predicate)?;
            }
            out.push_str("\t)\n");
        }
        out.push_str(")\n");

        if !problem.functions.is_empty() {
            out.push_str("(:functions\n");
            for function in &problem.functions {
                writeln!(out, "\t{}", function)?;
            }
            out.push_str(")\n");
        }

        for agent in &problem.agents {
            for action in &agent.actions {
                writeln!(out, "\n(:action {}_{}", action.name, agent.name)?;
                writeln!(out, "\t:agent {} - {}", action.agent_param, agent.agent_type)?;
                writeln!(out, "\t:parameters {}", ParamList(&action.parameters))?;
                writeln!(out, "\t:precondition {}", Conjunction(&action.precondition, "\t"))?;
                writeln!(out, "\t:effect {}", Conjunction(&action.effect, "\t"))?;
                out.push_str(")\n");
            }
        }

        out.push(')');
        Ok(())
    }

    fn write_problem(&self, out: &mut String) -> fmt::Result {
        let problem = self.problem;
        writeln!(
            out,
            "(define (problem {}) (:domain {})",
            problem.name, problem.domain_name
        )?;

        out.push_str("(:objects\n");
        for agent in &problem.agents {
            writeln!(out, "\t{} - {}", agent.name, agent.agent_type)?;
        }
        for (name, ty) in &problem.objects {
            writeln!(out, "\t{} - {}", name, ty)?;
        }
        out.push_str(")\n");

        out.push_str("(:init\n");
        for fact in &problem.init {
            writeln!(out, "\t{}", fact)?;
        }
        for value in &problem.numeric_init {
            writeln!(out, "\t{}", value)?;
        }
        out.push_str(")\n");

        out.push_str("(:goal\n\t(and\n");
        for literal in &problem.goal {
            writeln!(out, "\t\t{}", literal)?;
        }
        out.push_str("\t)\n)\n");

        if problem.metric {
            out.push_str("(:metric minimize (total-cost))\n");
        }
        out.push(')');
        Ok(())
    }
}

impl MultiAgentWriter for UnfactoredWriter<'_> {
    fn domain_text(&self) -> Result<String> {
        // Writing into a String cannot fail
        let mut out = String::new();
        let _ = self.write_domain(&mut out);
        Ok(out)
    }

    fn problem_text(&self) -> Result<String> {
        // Writing into a String cannot fail
        let mut out = String::new();
        let _ = self.write_problem(&mut out);
        Ok(out)
    }
}
