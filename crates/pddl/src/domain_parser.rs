//! DomainParser - MA-PDDL domain text to `Domain`
//!
//! The body of `(define (domain NAME) ...)` is split into section groups.
//! Each section is read by its own parser into a `DomainSection`, which the
//! dispatcher applies to a `DomainBuilder` owned by the current parse. The
//! builder is consumed by `finish()` once all sections are in.

use shared::{PlanningError, Result, UnsupportedError};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use crate::group::{expect_single_group, inner, split_groups, split_items, typed_list, Item};
use crate::literal::{parse_effects, parse_literals};
use crate::model::{
    Action, Domain, FunctionSignature, PredicateSignature, TypedParam, DEFAULT_DURATION,
    KNOWN_REQUIREMENTS, NUMBER_TYPE,
};
use crate::tokenizer::tokenize;
use crate::types::{ObjectTable, TypeHierarchy, ROOT_TYPE};

/// Typed result of one domain section
#[derive(Debug)]
enum DomainSection {
    Requirements(BTreeSet<String>),
    /// (child, parent) bindings in declaration order
    Types(Vec<(String, String)>),
    /// (constant, type)
    Constants(Vec<(String, String)>),
    Predicates(Vec<PredicateSignature>),
    Functions(Vec<FunctionSignature>),
    Action(Action),
    Skipped(String),
}

/// Accumulates one domain while its sections are parsed
#[derive(Debug)]
pub struct DomainBuilder {
    name: String,
    requirements: BTreeSet<String>,
    types: TypeHierarchy,
    constants: ObjectTable,
    predicates: Vec<PredicateSignature>,
    functions: Vec<FunctionSignature>,
    actions: Vec<Action>,
    agent_types: BTreeSet<String>,
}

impl DomainBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requirements: BTreeSet::new(),
            types: TypeHierarchy::new(),
            constants: ObjectTable::new(),
            predicates: Vec::new(),
            functions: Vec::new(),
            actions: Vec::new(),
            agent_types: BTreeSet::new(),
        }
    }

    /// Types declared so far
    pub fn types(&self) -> &TypeHierarchy {
        &self.types
    }

    fn apply(&mut self, section: DomainSection) -> Result<()> {
        match section {
            DomainSection::Requirements(flags) => self.requirements.extend(flags),
            DomainSection::Types(bindings) => {
                for (child, parent) in bindings {
                    self.types.declare(&child, &parent)?;
                }
            }
            DomainSection::Constants(constants) => {
                for (constant, ty) in constants {
                    self.constants.insert(&constant, &ty)?;
                }
            }
            DomainSection::Predicates(signatures) => {
                for signature in signatures {
                    self.add_predicate(signature)?;
                }
            }
            DomainSection::Functions(functions) => {
                for function in functions {
                    if !self.functions.contains(&function) {
                        self.functions.push(function);
                    }
                }
            }
            DomainSection::Action(action) => {
                if self.actions.iter().any(|a| a.name == action.name) {
                    return Err(PlanningError::syntax(format!(
                        "action '{}' defined twice",
                        action.name
                    )));
                }
                if let Some(agent_type) = &action.agent_type {
                    self.agent_types.insert(agent_type.clone());
                }
                self.actions.push(action);
            }
            DomainSection::Skipped(keyword) => {
                warn!(section = %keyword, "Skipping unsupported domain section");
            }
        }
        Ok(())
    }

    /// Private predicates of several agents may repeat a signature, possibly
    /// with other variable names. The first declaration is kept.
    fn add_predicate(&mut self, signature: PredicateSignature) -> Result<()> {
        let same_types = |existing: &PredicateSignature| {
            existing.arity() == signature.arity()
                && existing
                    .params
                    .iter()
                    .zip(&signature.params)
                    .all(|(a, b)| a.ty == b.ty)
        };
        match self.predicates.iter().find(|p| p.name == signature.name) {
            Some(existing) if same_types(existing) => Ok(()),
            Some(existing) => Err(PlanningError::syntax(format!(
                "predicate '{}' redeclared as {} (was {})",
                signature.name, signature, existing
            ))),
            None => {
                self.predicates.push(signature);
                Ok(())
            }
        }
    }

    pub fn finish(self) -> Domain {
        Domain {
            name: self.name,
            requirements: self.requirements,
            types: self.types,
            constants: self.constants,
            predicates: self.predicates,
            functions: self.functions,
            actions: self.actions,
            agent_types: self.agent_types,
        }
    }
}

/// Parser for MA-PDDL and classical PDDL domains
#[derive(Debug, Clone, Copy, Default)]
pub struct DomainParser;

impl DomainParser {
    /// Parse domain text
    pub fn parse(text: &str) -> Result<Domain> {
        Self::parse_tokens(&tokenize(text))
    }

    /// Parse an already tokenized domain
    pub fn parse_tokens(tokens: &[String]) -> Result<Domain> {
        expect_single_group(tokens, "domain file")?;
        if tokens.len() < 7 || tokens[..4] != ["(", "define", "(", "domain"] || tokens[5] != ")" {
            return Err(PlanningError::syntax(
                "expected (define (domain ... at start of domain file",
            ));
        }
        let name = &tokens[4];
        if name == "(" || name == ")" {
            return Err(PlanningError::syntax("domain name missing"));
        }

        let mut builder = DomainBuilder::new(name.clone());
        for group in split_groups(&tokens[6..tokens.len() - 1], "domain body")? {
            let section = parse_section(inner(group), &builder)?;
            builder.apply(section)?;
        }

        let domain = builder.finish();
        debug!(
            domain = %domain.name,
            types = domain.types.known_types().len(),
            predicates = domain.predicates.len(),
            actions = domain.actions.len(),
            "Parsed domain"
        );
        Ok(domain)
    }
}

fn section_keyword<'a>(body: &'a [String], context: &str) -> Result<&'a str> {
    match body.first() {
        Some(keyword) if keyword.starts_with(':') => Ok(&keyword[1..]),
        Some(other) => Err(PlanningError::syntax(format!(
            "expected a section keyword in {} but found '{}'",
            context, other
        ))),
        None => Err(PlanningError::syntax(format!("empty section in {}", context))),
    }
}

fn parse_section(body: &[String], builder: &DomainBuilder) -> Result<DomainSection> {
    let keyword = section_keyword(body, "domain")?;
    let rest = &body[1..];
    let types = builder.types();
    match keyword {
        "requirements" => parse_requirements(rest).map(DomainSection::Requirements),
        "types" => parse_types(rest).map(DomainSection::Types),
        "constants" => parse_constants(rest, types).map(DomainSection::Constants),
        "predicates" => parse_predicates(rest, types).map(DomainSection::Predicates),
        "private" => parse_private(rest, types).map(DomainSection::Predicates),
        "functions" => parse_functions(rest, types).map(DomainSection::Functions),
        "action" => parse_action(rest, types).map(DomainSection::Action),
        other => Ok(DomainSection::Skipped(other.to_string())),
    }
}

fn parse_requirements(tokens: &[String]) -> Result<BTreeSet<String>> {
    let mut flags = BTreeSet::new();
    for token in tokens {
        let flag = token.strip_prefix(':').ok_or_else(|| {
            PlanningError::syntax(format!(
                "expected requirement to start with ':' but found '{}'",
                token
            ))
        })?;
        if KNOWN_REQUIREMENTS.contains(&flag) {
            flags.insert(flag.to_string());
        } else {
            warn!(requirement = %flag, "Unknown requirement");
        }
    }
    Ok(flags)
}

fn parse_types(tokens: &[String]) -> Result<Vec<(String, String)>> {
    Ok(typed_list(tokens, "types")?
        .into_iter()
        .map(|(name, parent)| (name, parent.unwrap_or_else(|| ROOT_TYPE.to_string())))
        .collect())
}

/// Typed object list where untyped names default to `object`
pub(crate) fn typed_objects(
    tokens: &[String],
    types: &TypeHierarchy,
    context: &str,
) -> Result<Vec<(String, String)>> {
    typed_list(tokens, context)?
        .into_iter()
        .map(|(name, ty)| {
            let ty = ty.unwrap_or_else(|| ROOT_TYPE.to_string());
            types.require(&ty, context)?;
            Ok((name, ty))
        })
        .collect()
}

fn parse_constants(tokens: &[String], types: &TypeHierarchy) -> Result<Vec<(String, String)>> {
    typed_objects(tokens, types, "constants")
}

/// Parameters where every name must carry a known type
fn typed_params(tokens: &[String], types: &TypeHierarchy, context: &str) -> Result<Vec<TypedParam>> {
    typed_list(tokens, context)?
        .into_iter()
        .map(|(name, ty)| {
            let ty = ty.ok_or_else(|| {
                PlanningError::syntax(format!("expected '{}' to be typed in {}", name, context))
            })?;
            types.require(&ty, context)?;
            Ok(TypedParam::new(name, ty))
        })
        .collect()
}

fn parse_signature(body: &[String], types: &TypeHierarchy) -> Result<PredicateSignature> {
    let (name, params) = body
        .split_first()
        .ok_or_else(|| PlanningError::syntax("empty predicate declaration"))?;
    let context = format!("predicate '{}'", name);
    Ok(PredicateSignature::new(
        name.clone(),
        typed_params(params, types, &context)?,
    ))
}

fn parse_predicates(tokens: &[String], types: &TypeHierarchy) -> Result<Vec<PredicateSignature>> {
    let mut signatures = Vec::new();
    for group in split_groups(tokens, "predicates")? {
        let body = inner(group);
        if body.first().map(String::as_str) == Some(":private") {
            signatures.extend(parse_private(&body[1..], types)?);
        } else {
            signatures.push(parse_signature(body, types)?);
        }
    }
    Ok(signatures)
}

/// `(:private ?owner - type (pred ...) ...)`; the owner declaration is dropped
fn parse_private(tokens: &[String], types: &TypeHierarchy) -> Result<Vec<PredicateSignature>> {
    if tokens.len() < 3 || tokens[..3].iter().any(|t| t == "(" || t == ")") {
        return Err(PlanningError::syntax(
            "expected an owner declaration '?agent - type' after :private",
        ));
    }
    split_groups(&tokens[3..], "private predicates")?
        .into_iter()
        .map(|group| parse_signature(inner(group), types))
        .collect()
}

fn parse_functions(tokens: &[String], types: &TypeHierarchy) -> Result<Vec<FunctionSignature>> {
    let mut functions: Vec<FunctionSignature> = Vec::new();
    let mut items = split_items(tokens)?.into_iter();

    while let Some(item) = items.next() {
        match item {
            Item::Group(group) => {
                let body = inner(group);
                let (name, params) = body
                    .split_first()
                    .ok_or_else(|| PlanningError::syntax("empty function declaration"))?;
                let context = format!("function '{}'", name);
                functions.push(FunctionSignature {
                    name: name.clone(),
                    params: typed_params(params, types, &context)?,
                });
            }
            Item::Atom("-") => {
                if functions.is_empty() {
                    return Err(PlanningError::syntax("function type marker without a function"));
                }
                match items.next() {
                    Some(Item::Atom(NUMBER_TYPE)) => {}
                    Some(Item::Atom(other)) => {
                        return Err(UnsupportedError {
                            construct: format!("function type '{}'", other),
                            context: "functions".to_string(),
                        }
                        .into());
                    }
                    _ => return Err(PlanningError::syntax("expected a type after '-' in functions")),
                }
            }
            Item::Atom(other) => {
                return Err(PlanningError::syntax(format!(
                    "unexpected '{}' in functions",
                    other
                )));
            }
        }
    }
    Ok(functions)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ActionKeyword {
    Agent,
    Parameters,
    Precondition,
    Effect,
    Duration,
}

impl ActionKeyword {
    fn from_token(token: &str, action: &str) -> Result<Self> {
        match token {
            ":agent" => Ok(Self::Agent),
            ":parameters" => Ok(Self::Parameters),
            ":precondition" => Ok(Self::Precondition),
            ":effect" => Ok(Self::Effect),
            ":duration" => Ok(Self::Duration),
            other => Err(PlanningError::syntax(format!(
                "unknown keyword '{}' in action '{}'",
                other, action
            ))),
        }
    }
}

fn parse_action(tokens: &[String], types: &TypeHierarchy) -> Result<Action> {
    let tokens = if tokens.first().map(String::as_str) == Some("-") {
        tokens.get(2..).unwrap_or(&[])
    } else {
        tokens
    };
    let (name, rest) = tokens
        .split_first()
        .filter(|(name, _)| !matches!(name.as_str(), "(" | ")") && !name.starts_with(':'))
        .ok_or_else(|| PlanningError::syntax("action without a name"))?;

    let mut buckets: BTreeMap<ActionKeyword, Vec<String>> = BTreeMap::new();
    let mut current: Option<ActionKeyword> = None;
    for item in split_items(rest)? {
        match item {
            Item::Atom(token) if token.starts_with(':') => {
                let keyword = ActionKeyword::from_token(token, name)?;
                if buckets.insert(keyword, Vec::new()).is_some() {
                    return Err(PlanningError::syntax(format!(
                        "'{}' given twice in action '{}'",
                        token, name
                    )));
                }
                current = Some(keyword);
            }
            other => {
                let keyword = current.ok_or_else(|| {
                    PlanningError::syntax(format!("expected a keyword in action '{}'", name))
                })?;
                let bucket = buckets.entry(keyword).or_default();
                match other {
                    Item::Atom(token) => bucket.push(token.to_string()),
                    Item::Group(group) => bucket.extend(group.iter().cloned()),
                }
            }
        }
    }

    let mut parameters = Vec::new();
    let mut agent_type = None;
    if let Some(agent) = buckets.get(&ActionKeyword::Agent) {
        let agent = match agent.as_slice() {
            [param, dash, ty] if dash == "-" && param != "(" => TypedParam::new(param.clone(), ty.clone()),
            _ => {
                return Err(PlanningError::syntax(format!(
                    "expected ':agent ?a - type' in action '{}'",
                    name
                )))
            }
        };
        types.require(&agent.ty, &format!("agent of action '{}'", name))?;
        agent_type = Some(agent.ty.clone());
        parameters.push(agent);
    }

    if let Some(declared) = buckets.get(&ActionKeyword::Parameters) {
        let group = match split_items(declared)?.as_slice() {
            [Item::Group(group)] => *group,
            _ => {
                return Err(PlanningError::syntax(format!(
                    "expected a parenthesized parameter list in action '{}'",
                    name
                )))
            }
        };
        let context = format!("parameters of action '{}'", name);
        parameters.extend(typed_params(inner(group), types, &context)?);
    }

    let empty = Vec::new();
    let precondition = parse_literals(
        buckets.get(&ActionKeyword::Precondition).unwrap_or(&empty),
        &format!("precondition of action '{}'", name),
    )?;
    let effect = parse_effects(
        buckets.get(&ActionKeyword::Effect).unwrap_or(&empty),
        &format!("effect of action '{}'", name),
    )?;
    let duration = buckets
        .get(&ActionKeyword::Duration)
        .filter(|tokens| !tokens.is_empty())
        .map(|tokens| tokens.join(" "))
        .unwrap_or_else(|| DEFAULT_DURATION.to_string());

    Ok(Action {
        name: name.clone(),
        agent_type,
        parameters,
        precondition,
        effect,
        duration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Atom, Effect, Literal};
    use crate::fixtures::ROBOT_DOMAIN;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_multi_agent_domain() {
        let domain = DomainParser::parse(ROBOT_DOMAIN).unwrap();
        assert_eq!(domain.name, "robots");
        assert!(domain.requirements.contains("multi-agent"));
        assert_eq!(
            domain.classical_requirements().collect::<Vec<_>>(),
            vec!["typing"]
        );
        assert!(domain.types.is_subtype("robot", "object"));
        assert_eq!(domain.predicates.len(), 2);
        assert_eq!(domain.predicate("busy").map(|p| p.arity()), Some(1));
        assert_eq!(
            domain.agent_types,
            BTreeSet::from(["robot".to_string()])
        );

        let action = domain.action("move").unwrap();
        assert_eq!(action.agent_type.as_deref(), Some("robot"));
        assert_eq!(
            action.parameters,
            vec![
                TypedParam::new("?r", "robot"),
                TypedParam::new("?from", "location"),
                TypedParam::new("?to", "location"),
            ]
        );
        assert_eq!(action.ordinary_parameters().len(), 2);
        assert_eq!(
            action.precondition,
            vec![Literal::positive(Atom::new("at", ["?r", "?from"]))]
        );
        assert_eq!(
            action.effect,
            vec![
                Effect::Literal(Literal::negative(Atom::new("at", ["?r", "?from"]))),
                Effect::Literal(Literal::positive(Atom::new("at", ["?r", "?to"]))),
            ]
        );
        assert_eq!(action.duration, "1");
    }

    #[test]
    fn test_bad_header_is_fatal() {
        let err = DomainParser::parse("(define (problem robots))").unwrap_err();
        assert!(matches!(err, PlanningError::Syntax(_)));
        assert!(DomainParser::parse("(define (domain robots)").is_err());
        assert!(DomainParser::parse("").is_err());
    }

    #[test]
    fn test_malformed_requirement_is_fatal() {
        let err = DomainParser::parse("(define (domain d) (:requirements typing))").unwrap_err();
        assert!(matches!(err, PlanningError::Syntax(_)));
    }

    #[test]
    fn test_unknown_requirement_only_warns() {
        let domain =
            DomainParser::parse("(define (domain d) (:requirements :typing :fluents))").unwrap();
        assert_eq!(domain.requirements, BTreeSet::from(["typing".to_string()]));
    }

    #[test]
    fn test_constants_need_known_types() {
        let err = DomainParser::parse(
            "(define (domain d) (:types place) (:constants depot - warehouse))",
        )
        .unwrap_err();
        assert!(matches!(err, PlanningError::UnknownType(_)));

        let domain = DomainParser::parse(
            "(define (domain d) (:types place) (:constants depot hub - place base))",
        )
        .unwrap();
        assert_eq!(domain.constants.type_of("hub"), Some("place"));
        assert_eq!(domain.constants.type_of("base"), Some("object"));
    }

    #[test]
    fn test_unknown_parameter_type_is_fatal() {
        let err = DomainParser::parse(
            "(define (domain d) (:types robot)
               (:action go :agent ?r - robot :parameters (?x - place) :effect (done ?r)))",
        )
        .unwrap_err();
        assert!(matches!(err, PlanningError::UnknownType(_)));
    }

    #[test]
    fn test_type_hierarchy_and_seeding() {
        let domain = DomainParser::parse(
            "(define (domain d) (:types robot - agent agent - object truck - vehicle place))",
        )
        .unwrap();
        assert_eq!(domain.types.parent("agent"), Some("object"));
        assert_eq!(domain.types.parent("robot"), Some("agent"));
        assert_eq!(domain.types.parent("vehicle"), Some("object"));
        assert_eq!(domain.types.parent("place"), Some("object"));
    }

    #[test]
    fn test_functions_and_cost_effects() {
        let domain = DomainParser::parse(
            "(define (domain d)
               (:requirements :typing :action-costs)
               (:types place)
               (:functions (total-cost) - number (dist ?a - place ?b - place) - number)
               (:action wait :parameters () :precondition (and) :effect (increase (total-cost) 1)))",
        )
        .unwrap();
        assert_eq!(domain.functions.len(), 2);
        assert_eq!(domain.functions[1].params.len(), 2);
        let wait = domain.action("wait").unwrap();
        assert!(wait.agent_type.is_none());
        assert!(wait.precondition.is_empty());
        assert_eq!(wait.effect, vec![Effect::IncreaseCost(1.0)]);
    }

    #[test]
    fn test_non_number_function_rejected() {
        let err = DomainParser::parse(
            "(define (domain d) (:types place) (:functions (home ?a - place) - place))",
        )
        .unwrap_err();
        assert!(matches!(err, PlanningError::Unsupported(_)));
    }

    #[test]
    fn test_predicate_arity_is_fixed() {
        let err = DomainParser::parse(
            "(define (domain d) (:types place)
               (:predicates (at ?a - place) (:private ?r - object (at ?a - place ?b - place))))",
        )
        .unwrap_err();
        assert!(matches!(err, PlanningError::Syntax(_)));
    }

    #[test]
    fn test_private_redeclaration_may_rename_variables() {
        let domain = DomainParser::parse(
            "(define (domain d) (:types robot)
               (:predicates
                 (:private ?a - robot (busy ?r - robot))
                 (:private ?b - robot (busy ?x - robot))))",
        )
        .unwrap();
        assert_eq!(domain.predicates.len(), 1);
        assert_eq!(domain.predicates[0].params[0].name, "?r");

        let err = DomainParser::parse(
            "(define (domain d) (:types robot place)
               (:predicates
                 (:private ?a - robot (busy ?r - robot))
                 (:private ?b - robot (busy ?x - place))))",
        )
        .unwrap_err();
        assert!(matches!(err, PlanningError::Syntax(_)));
    }

    #[test]
    fn test_untyped_parameters_rejected() {
        let err = DomainParser::parse("(define (domain d) (:predicates (at ?a)))").unwrap_err();
        assert!(matches!(err, PlanningError::Syntax(_)));
    }

    #[test]
    fn test_duration_is_carried() {
        let domain = DomainParser::parse(
            "(define (domain d) (:types r)
               (:action spin :agent ?r - r :parameters () :duration (= ?duration 4) :effect (spun ?r)))",
        )
        .unwrap();
        assert_eq!(domain.action("spin").unwrap().duration, "( = ?duration 4 )");
    }

    #[test]
    fn test_unknown_sections_are_skipped() {
        let domain = DomainParser::parse(
            "(define (domain d) (:derived (x) (y)) (:predicates (y)))",
        )
        .unwrap();
        assert_eq!(domain.predicates.len(), 1);
    }
}
