//! Literal lists for preconditions, effects and goals
//!
//! A list is either a single literal or an `(and ...)` conjunction of them.
//! Each literal is `(name arg...)` or `(not (name arg...))` with atomic
//! arguments; anything richer is rejected.

use shared::{PlanningError, Result, UnsupportedError};

use crate::group::{inner, split_groups};
use crate::model::{Atom, Effect, Literal, TOTAL_COST};

/// Connectives and quantifiers the flat literal model cannot hold
const UNSUPPORTED_HEADS: &[&str] = &["and", "or", "forall", "exists", "imply", "when"];

/// Numeric update heads
const NUMERIC_HEADS: &[&str] = &["increase", "decrease", "assign", "scale-up", "scale-down"];

fn unsupported(construct: impl Into<String>, context: &str) -> PlanningError {
    UnsupportedError {
        construct: construct.into(),
        context: context.to_string(),
    }
    .into()
}

/// Split a condition into its conjuncts, each a balanced group
fn conjuncts<'a>(tokens: &'a [String], context: &str) -> Result<Vec<&'a [String]>> {
    if tokens.is_empty() || tokens == ["(", "and", ")"] || tokens == ["(", ")"] {
        return Ok(Vec::new());
    }
    let body = if tokens.len() >= 3 && tokens[..3] == ["(", "and", "("] {
        &tokens[2..tokens.len() - 1]
    } else {
        tokens
    };
    split_groups(body, context)
}

/// One possibly negated chunk, returned as (negated, inner tokens)
fn unwrap_negation<'a>(chunk: &'a [String], context: &str) -> Result<(bool, &'a [String])> {
    let body = inner(chunk);
    if body.first().map(String::as_str) != Some("not") {
        return Ok((false, body));
    }
    let negated = split_groups(&body[1..], context)?;
    match negated.as_slice() {
        [single] => Ok((true, inner(single))),
        _ => Err(PlanningError::syntax(format!(
            "(not ...) must wrap exactly one literal in {}",
            context
        ))),
    }
}

fn atom_from(body: &[String], context: &str) -> Result<Atom> {
    let (name, args) = body
        .split_first()
        .ok_or_else(|| PlanningError::syntax(format!("empty literal in {}", context)))?;
    if name == "(" || name == "not" || UNSUPPORTED_HEADS.contains(&name.as_str()) {
        return Err(unsupported(format!("nested '{}' expression", name), context));
    }
    if NUMERIC_HEADS.contains(&name.as_str()) {
        return Err(unsupported(format!("numeric '{}' expression", name), context));
    }
    if args.iter().any(|a| a == "(" || a == ")") {
        return Err(unsupported(
            format!("non-atomic argument in '{}'", name),
            context,
        ));
    }
    Ok(Atom::new(name.clone(), args.iter().cloned()))
}

fn parse_literal(chunk: &[String], context: &str) -> Result<Literal> {
    let (negated, body) = unwrap_negation(chunk, context)?;
    let atom = atom_from(body, context)?;
    Ok(Literal { atom, negated })
}

/// Parse a precondition or goal
pub fn parse_literals(tokens: &[String], context: &str) -> Result<Vec<Literal>> {
    conjuncts(tokens, context)?
        .into_iter()
        .map(|chunk| parse_literal(chunk, context))
        .collect()
}

/// `(increase (total-cost) N)`, the one numeric effect kept
fn parse_cost_increase(body: &[String], context: &str) -> Result<Effect> {
    match body {
        [head, open, function, close, amount]
            if head == "increase" && open == "(" && function == TOTAL_COST && close == ")" =>
        {
            let value = amount
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| unsupported(format!("non-constant cost '{}'", amount), context))?;
            Ok(Effect::IncreaseCost(value))
        }
        _ => Err(unsupported(
            format!("numeric effect '{}'", body.join(" ")),
            context,
        )),
    }
}

/// Parse an effect list
pub fn parse_effects(tokens: &[String], context: &str) -> Result<Vec<Effect>> {
    conjuncts(tokens, context)?
        .into_iter()
        .map(|chunk| {
            let body = inner(chunk);
            match body.first() {
                Some(head) if NUMERIC_HEADS.contains(&head.as_str()) => {
                    parse_cost_increase(body, context)
                }
                _ => parse_literal(chunk, context).map(Effect::Literal),
            }
        })
        .collect()
}
