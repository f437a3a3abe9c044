//! Domain and problem model
//!
//! Each construct is its own type and renders itself in PDDL syntax through
//! `Display`:
//!
//! - `TypedParam` - `?x - type`, used in signatures and parameter lists
//! - `PredicateSignature` - `(name ?x - type ...)`
//! - `Atom` - `(name a b)`, a ground fact or lifted application
//! - `Literal` - an atom that may be negated
//! - `Effect` - a literal or a `total-cost` increment
//! - `FunctionSignature` / `GroundFunction` - numeric declarations and values

use std::collections::BTreeSet;
use std::fmt;

use crate::types::{ObjectTable, TypeHierarchy};

/// Requirement flags the parser understands
pub const KNOWN_REQUIREMENTS: &[&str] = &[
    "typing",
    "strips",
    "multi-agent",
    "unfactored-privacy",
    "factored-privacy",
    "negative-preconditions",
    "equality",
    "action-costs",
];

/// Requirement flags that only exist in the multi-agent dialect
pub const MULTI_AGENT_REQUIREMENTS: &[&str] =
    &["multi-agent", "unfactored-privacy", "factored-privacy"];

/// The only function type the translation supports
pub const NUMBER_TYPE: &str = "number";

/// Function that action costs accumulate into
pub const TOTAL_COST: &str = "total-cost";

/// Duration of an action that declares none
pub const DEFAULT_DURATION: &str = "1";

fn write_args(f: &mut fmt::Formatter<'_>, args: &[String]) -> fmt::Result {
    for arg in args {
        write!(f, " {}", arg)?;
    }
    Ok(())
}

/// A lifted, typed parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypedParam {
    pub name: String,
    pub ty: String,
}

impl TypedParam {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

impl fmt::Display for TypedParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.ty)
    }
}

/// Render a parameter list as `(?a - t ?b - u)`
pub struct ParamList<'a>(pub &'a [TypedParam]);

impl fmt::Display for ParamList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, param) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", param)?;
        }
        f.write_str(")")
    }
}

/// Declared predicate with a fixed arity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateSignature {
    pub name: String,
    pub params: Vec<TypedParam>,
}

impl PredicateSignature {
    pub fn new(name: impl Into<String>, params: Vec<TypedParam>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for PredicateSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.name)?;
        for param in &self.params {
            write!(f, " {}", param)?;
        }
        f.write_str(")")
    }
}

/// Predicate applied to objects or variables
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom {
    pub name: String,
    pub args: Vec<String>,
}

impl Atom {
    pub fn new<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.name)?;
        write_args(f, &self.args)?;
        f.write_str(")")
    }
}

/// Atom that may be negated
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    pub atom: Atom,
    pub negated: bool,
}

impl Literal {
    pub fn positive(atom: Atom) -> Self {
        Self {
            atom,
            negated: false,
        }
    }

    pub fn negative(atom: Atom) -> Self {
        Self {
            atom,
            negated: true,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "(not {})", self.atom)
        } else {
            write!(f, "{}", self.atom)
        }
    }
}

/// Action effect
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Add (positive) or delete (negated) a fact
    Literal(Literal),
    /// `(increase (total-cost) N)`
    IncreaseCost(f64),
}

impl From<Literal> for Effect {
    fn from(literal: Literal) -> Self {
        Effect::Literal(literal)
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Literal(literal) => write!(f, "{}", literal),
            Effect::IncreaseCost(amount) => write!(f, "(increase ({}) {})", TOTAL_COST, amount),
        }
    }
}

/// Numeric function declaration, always of type `number`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<TypedParam>,
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.name)?;
        for param in &self.params {
            write!(f, " {}", param)?;
        }
        write!(f, ") - {}", NUMBER_TYPE)
    }
}

/// Ground numeric assignment from the initial state
#[derive(Debug, Clone, PartialEq)]
pub struct GroundFunction {
    pub name: String,
    pub args: Vec<String>,
    pub value: f64,
}

impl fmt::Display for GroundFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(= ({}", self.name)?;
        write_args(f, &self.args)?;
        write!(f, ") {})", self.value)
    }
}

/// Non-temporal action schema
///
/// In the multi-agent dialect the agent parameter comes first in
/// `parameters` and `agent_type` is set. Classical actions have no agent type.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub name: String,
    pub agent_type: Option<String>,
    pub parameters: Vec<TypedParam>,
    pub precondition: Vec<Literal>,
    pub effect: Vec<Effect>,
    /// Carried verbatim, never interpreted
    pub duration: String,
}

impl Action {
    /// Parameters after the agent parameter
    pub fn ordinary_parameters(&self) -> &[TypedParam] {
        if self.agent_type.is_some() {
            self.parameters.get(1..).unwrap_or(&[])
        } else {
            &self.parameters
        }
    }

    pub fn agent_parameter(&self) -> Option<&TypedParam> {
        self.agent_type.as_ref().and(self.parameters.first())
    }
}

/// Parsed domain
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    pub name: String,
    pub requirements: BTreeSet<String>,
    pub types: TypeHierarchy,
    pub constants: ObjectTable,
    pub predicates: Vec<PredicateSignature>,
    pub functions: Vec<FunctionSignature>,
    pub actions: Vec<Action>,
    /// Types used as agent parameters
    pub agent_types: BTreeSet<String>,
}

impl Domain {
    /// Requirements with the multi-agent-only flags removed
    pub fn classical_requirements(&self) -> impl Iterator<Item = &str> {
        self.requirements
            .iter()
            .map(String::as_str)
            .filter(|r| !MULTI_AGENT_REQUIREMENTS.contains(r))
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    pub fn predicate(&self, name: &str) -> Option<&PredicateSignature> {
        self.predicates.iter().find(|p| p.name == name)
    }
}

/// Parsed problem
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub name: String,
    pub domain_name: String,
    pub objects: ObjectTable,
    pub init: Vec<Atom>,
    pub numeric_init: Vec<GroundFunction>,
    pub goal: Vec<Literal>,
    /// `(:metric minimize (total-cost))` present
    pub metric: bool,
}
