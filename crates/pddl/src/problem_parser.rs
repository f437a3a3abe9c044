//! ProblemParser - MA-PDDL problem text to `Problem`

use shared::{DomainMismatchError, PlanningError, Result, UnsupportedError};
use tracing::{debug, error};

use crate::domain_parser::typed_objects;
use crate::group::{expect_single_group, inner, split_groups, split_items, Item};
use crate::literal::parse_literals;
use crate::model::{Atom, Domain, GroundFunction, Literal, Problem};
use crate::tokenizer::tokenize;
use crate::types::{ObjectTable, TypeHierarchy};

/// Section keywords a problem may contain
pub const PROBLEM_SECTIONS: &[&str] = &["objects", "init", "goal", "private", "metric"];

/// Typed result of one problem section
#[derive(Debug)]
enum ProblemSection {
    Objects(Vec<(String, String)>),
    Init {
        facts: Vec<Atom>,
        numeric: Vec<GroundFunction>,
    },
    Goal(Vec<Literal>),
    Metric,
}

/// Accumulates one problem while its sections are parsed
#[derive(Debug)]
struct ProblemBuilder {
    name: String,
    domain_name: String,
    objects: ObjectTable,
    init: Vec<Atom>,
    numeric_init: Vec<GroundFunction>,
    goal: Vec<Literal>,
    metric: bool,
}

impl ProblemBuilder {
    fn apply(&mut self, section: ProblemSection) -> Result<()> {
        match section {
            ProblemSection::Objects(objects) => {
                for (object, ty) in objects {
                    self.objects.insert(&object, &ty)?;
                }
            }
            ProblemSection::Init { facts, numeric } => {
                self.init.extend(facts);
                self.numeric_init.extend(numeric);
            }
            ProblemSection::Goal(literals) => self.goal.extend(literals),
            ProblemSection::Metric => self.metric = true,
        }
        Ok(())
    }

    fn finish(self) -> Problem {
        Problem {
            name: self.name,
            domain_name: self.domain_name,
            objects: self.objects,
            init: self.init,
            numeric_init: self.numeric_init,
            goal: self.goal,
            metric: self.metric,
        }
    }
}

/// Parser for problems of a given domain
#[derive(Debug, Clone, Copy)]
pub struct ProblemParser<'d> {
    domain: &'d Domain,
    strict_domain_name: bool,
}

impl<'d> ProblemParser<'d> {
    pub fn new(domain: &'d Domain) -> Self {
        Self {
            domain,
            strict_domain_name: false,
        }
    }

    /// Fail instead of logging when the problem names another domain
    pub fn strict_domain_name(mut self, strict: bool) -> Self {
        self.strict_domain_name = strict;
        self
    }

    pub fn parse(&self, text: &str) -> Result<Problem> {
        self.parse_tokens(&tokenize(text))
    }

    pub fn parse_tokens(&self, tokens: &[String]) -> Result<Problem> {
        expect_single_group(tokens, "problem file")?;
        if tokens.len() < 11 || tokens[..4] != ["(", "define", "(", "problem"] {
            return Err(PlanningError::syntax(
                "expected (define (problem ... at start of problem file",
            ));
        }
        let name = tokens[4].clone();
        if tokens[5..8] != [")", "(", ":domain"] {
            return Err(PlanningError::syntax(
                "expected (:domain ...) after (define (problem ...)",
            ));
        }
        let domain_name = tokens[8].clone();
        if tokens[9] != ")" {
            return Err(PlanningError::syntax("expected end of domain declaration"));
        }
        if domain_name != self.domain.name {
            let mismatch = DomainMismatchError {
                problem: name.clone(),
                expected: self.domain.name.clone(),
                found: domain_name.clone(),
            };
            if self.strict_domain_name {
                return Err(mismatch.into());
            }
            error!("{}", mismatch);
        }

        let mut builder = ProblemBuilder {
            name,
            domain_name,
            objects: ObjectTable::new(),
            init: Vec::new(),
            numeric_init: Vec::new(),
            goal: Vec::new(),
            metric: false,
        };
        for group in split_groups(&tokens[10..tokens.len() - 1], "problem body")? {
            let section = self.parse_section(inner(group))?;
            builder.apply(section)?;
        }

        let problem = builder.finish();
        debug!(
            problem = %problem.name,
            objects = problem.objects.len(),
            facts = problem.init.len(),
            goals = problem.goal.len(),
            "Parsed problem"
        );
        Ok(problem)
    }

    fn parse_section(&self, body: &[String]) -> Result<ProblemSection> {
        let keyword = body
            .first()
            .and_then(|k| k.strip_prefix(':'))
            .ok_or_else(|| PlanningError::syntax("expected a section keyword in problem"))?;
        let rest = &body[1..];
        match keyword {
            "objects" => parse_objects(rest, &self.domain.types).map(ProblemSection::Objects),
            "private" => parse_private_objects(rest, &self.domain.types).map(ProblemSection::Objects),
            "init" => parse_init(rest),
            "goal" => parse_literals(rest, "goal").map(ProblemSection::Goal),
            "metric" => Ok(ProblemSection::Metric),
            other => Err(PlanningError::syntax(format!(
                "Unknown keyword: {}. Known keywords: {}",
                other,
                PROBLEM_SECTIONS.join(", ")
            ))),
        }
    }
}

/// Objects, with nested `(:private owner ...)` groups flattened in
fn parse_objects(tokens: &[String], types: &TypeHierarchy) -> Result<Vec<(String, String)>> {
    let mut objects = Vec::new();
    let mut run: Vec<String> = Vec::new();
    for item in split_items(tokens)? {
        match item {
            Item::Atom(atom) => run.push(atom.to_string()),
            Item::Group(group) => {
                let body = inner(group);
                if body.first().map(String::as_str) != Some(":private") {
                    return Err(PlanningError::syntax(format!(
                        "unexpected group {} in objects",
                        group.join(" ")
                    )));
                }
                objects.extend(typed_objects(&run, types, "objects")?);
                run.clear();
                objects.extend(parse_private_objects(&body[1..], types)?);
            }
        }
    }
    objects.extend(typed_objects(&run, types, "objects")?);
    Ok(objects)
}

/// `owner obj... - type ...`; the owner token is skipped
fn parse_private_objects(tokens: &[String], types: &TypeHierarchy) -> Result<Vec<(String, String)>> {
    match tokens.split_first() {
        Some((owner, rest)) if owner != "(" && owner != ")" => {
            typed_objects(rest, types, &format!("private objects of '{}'", owner))
        }
        _ => Err(PlanningError::syntax("expected an owner after :private")),
    }
}

fn ground_atom(body: &[String], context: &str) -> Result<Atom> {
    let (name, args) = body
        .split_first()
        .ok_or_else(|| PlanningError::syntax(format!("empty fact in {}", context)))?;
    if name == "(" || name == "not" || args.iter().any(|a| a == "(" || a == ")") {
        return Err(UnsupportedError {
            construct: format!("non-atomic fact ({})", body.join(" ")),
            context: context.to_string(),
        }
        .into());
    }
    Ok(Atom::new(name.clone(), args.iter().cloned()))
}

/// `= (name args...) value`
fn ground_function(body: &[String]) -> Result<GroundFunction> {
    let groups = split_items(&body[1..])?;
    match groups.as_slice() {
        [Item::Group(function), Item::Atom(value)] => {
            let atom = ground_atom(inner(function), "init")?;
            let value = value
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| UnsupportedError {
                    construct: format!("non-numeric value '{}'", value),
                    context: format!("initial value of '{}'", atom.name),
                })?;
            Ok(GroundFunction {
                name: atom.name,
                args: atom.args,
                value,
            })
        }
        _ => Err(UnsupportedError {
            construct: format!("numeric assignment ({})", body.join(" ")),
            context: "init".to_string(),
        }
        .into()),
    }
}

fn parse_init(tokens: &[String]) -> Result<ProblemSection> {
    let mut facts = Vec::new();
    let mut numeric = Vec::new();
    for group in split_groups(tokens, "init")? {
        let body = inner(group);
        if body.first().map(String::as_str) == Some("=") {
            numeric.push(ground_function(body)?);
        } else {
            facts.push(ground_atom(body, "init")?);
        }
    }
    Ok(ProblemSection::Init { facts, numeric })
}
