//! ClassicalSerializer - `Domain`/`Problem` to single-agent PDDL text
//!
//! The agent parameter becomes ordinary parameter 0 and the multi-agent-only
//! requirement flags are dropped. The output re-parses to an equal model.

use shared::{ObjectLookupError, Result};
use std::fmt::{self, Write};

use crate::model::{Domain, ParamList, Problem};

/// `(and ...)` unless there is exactly one item
pub(crate) struct Conjunction<'a, T>(pub &'a [T], pub &'a str);

impl<T: fmt::Display> fmt::Display for Conjunction<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Conjunction(items, indent) = self;
        match items {
            [] => f.write_str("(and)"),
            [single] => write!(f, "{}", single),
            _ => {
                f.write_str("(and\n")?;
                for item in items.iter() {
                    writeln!(f, "{}\t{}", indent, item)?;
                }
                write!(f, "{})", indent)
            }
        }
    }
}

/// Writer for the classical dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicalSerializer;

impl ClassicalSerializer {
    /// Render a domain
    pub fn domain_text(domain: &Domain) -> String {
        // Writing into a String cannot fail
        let mut out = String::new();
        let _ = Self::write_domain(&mut out, domain);
        out
    }

    fn write_domain(out: &mut String, domain: &Domain) -> fmt::Result {
        writeln!(out, "(define (domain {})", domain.name)?;

        out.push_str("\t(:requirements");
        for requirement in domain.classical_requirements() {
            write!(out, " :{}", requirement)?;
        }
        out.push_str(")\n");

        if !domain.types.is_empty() {
            out.push_str("(:types\n");
            for (supertype, subtypes) in domain.types.subtypes() {
                writeln!(out, "\t{} - {}", subtypes.join(" "), supertype)?;
            }
            out.push_str(")\n");
        }

        if !domain.constants.is_empty() {
            out.push_str("(:constants\n");
            for (ty, constants) in domain.constants.by_type() {
                writeln!(out, "\t{} - {}", constants.join(" "), ty)?;
            }
            out.push_str(")\n");
        }

        out.push_str("(:predicates\n");
        for predicate in &domain.predicates {
            writeln!(out, "\t{}", predicate)?;
        }
        out.push_str(")\n");

        if !domain.functions.is_empty() {
            out.push_str("(:functions\n");
            for function in &domain.functions {
                writeln!(out, "\t{}", function)?;
            }
            out.push_str(")\n");
        }

        for action in &domain.actions {
            writeln!(out, "\n(:action {}", action.name)?;
            writeln!(out, "\t:parameters {}", ParamList(&action.parameters))?;
            writeln!(out, "\t:precondition {}", Conjunction(&action.precondition, "\t"))?;
            writeln!(out, "\t:effect {}", Conjunction(&action.effect, "\t"))?;
            out.push_str(")\n");
        }

        out.push(')');
        Ok(())
    }

    /// Render a problem of `domain`.
    ///
    /// Fails with `ObjectLookupError` when init or goal mention a name that
    /// is neither a problem object nor a domain constant.
    pub fn problem_text(domain: &Domain, problem: &Problem) -> Result<String> {
        let resolve = |object: &str, context: &str| -> Result<()> {
            if problem.objects.contains(object) || domain.constants.contains(object) {
                Ok(())
            } else {
                Err(ObjectLookupError {
                    object: object.to_string(),
                    context: context.to_string(),
                }
                .into())
            }
        };
        for fact in &problem.init {
            fact.args.iter().try_for_each(|a| resolve(a, "init"))?;
        }
        for value in &problem.numeric_init {
            value.args.iter().try_for_each(|a| resolve(a, "init"))?;
        }
        for literal in &problem.goal {
            literal.atom.args.iter().try_for_each(|a| resolve(a, "goal"))?;
        }

        let mut out = String::new();
        let _ = Self::write_problem(&mut out, domain, problem);
        Ok(out)
    }

    fn write_problem(out: &mut String, domain: &Domain, problem: &Problem) -> fmt::Result {
        writeln!(out, "(define (problem {}) (:domain {})", problem.name, domain.name)?;

        out.push_str("(:objects\n");
        for (object, ty) in problem.objects.iter() {
            writeln!(out, "\t{} - {}", object, ty)?;
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
