//! Balanced-group splitting and typed lists over token slices

use shared::{PlanningError, Result, UnsupportedError};

/// One element of a token sequence at a fixed nesting level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item<'a> {
    /// A bare atom
    Atom(&'a str),
    /// A balanced group, outer parentheses included
    Group(&'a [String]),
}

impl<'a> Item<'a> {
    /// Tokens strictly inside a group, `None` for atoms
    pub fn inner(&self) -> Option<&'a [String]> {
        match self {
            Item::Group(tokens) => Some(inner(tokens)),
            Item::Atom(_) => None,
        }
    }
}

/// Strip the outer parentheses of a balanced group
pub fn inner(group: &[String]) -> &[String] {
    if group.len() >= 2 {
        &group[1..group.len() - 1]
    } else {
        &[]
    }
}

/// Split a token slice into top-level atoms and balanced groups
pub fn split_items(tokens: &[String]) -> Result<Vec<Item<'_>>> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, token) in tokens.iter().enumerate() {
        match token.as_str() {
            "(" => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            ")" => {
                if depth == 0 {
                    return Err(PlanningError::syntax(format!(
                        "unexpected ')' at token {}",
                        i
                    )));
                }
                depth -= 1;
                if depth == 0 {
                    items.push(Item::Group(&tokens[start..=i]));
                }
            }
            atom if depth == 0 => items.push(Item::Atom(atom)),
            _ => {}
        }
    }

    if depth != 0 {
        return Err(PlanningError::syntax(format!(
            "unbalanced parentheses: {} group(s) left open",
            depth
        )));
    }
    Ok(items)
}

/// Check that a whole file is exactly one balanced group
pub fn expect_single_group(tokens: &[String], what: &str) -> Result<()> {
    match split_items(tokens)?.as_slice() {
        [Item::Group(_)] => Ok(()),
        [] => Err(PlanningError::syntax(format!("{} is empty", what))),
        _ => Err(PlanningError::syntax(format!(
            "{} must be a single parenthesized definition",
            what
        ))),
    }
}

/// Split a token slice that must consist of groups only
pub fn split_groups<'a>(tokens: &'a [String], context: &str) -> Result<Vec<&'a [String]>> {
    split_items(tokens)?
        .into_iter()
        .map(|item| match item {
            Item::Group(group) => Ok(group),
            Item::Atom(atom) => Err(PlanningError::syntax(format!(
                "expected '(' in {} but found '{}'",
                context, atom
            ))),
        })
        .collect()
}

/// Read a `name name - type name - type name` list.
///
/// Names are buffered until a `-` separator and then all receive the type
/// that follows it. Names left at the end have no type.
pub fn typed_list(tokens: &[String], context: &str) -> Result<Vec<(String, Option<String>)>> {
    let mut entries = Vec::new();
    let mut pending: Vec<String> = Vec::new();
    let mut iter = tokens.iter();

    while let Some(token) = iter.next() {
        match token.as_str() {
            "-" => {
                let ty = iter.next().ok_or_else(|| {
                    PlanningError::syntax(format!("expected a type after '-' in {}", context))
                })?;
                if ty == "(" {
                    return Err(UnsupportedError {
                        construct: "compound type (either ...)".to_string(),
                        context: context.to_string(),
                    }
                    .into());
                }
                if ty == ")" || ty == "-" {
                    return Err(PlanningError::syntax(format!(
                        "expected a type after '-' in {} but found '{}'",
                        context, ty
                    )));
                }
                if pending.is_empty() {
                    return Err(PlanningError::syntax(format!(
                        "type '{}' has no names to apply to in {}",
                        ty, context
                    )));
                }
                entries.extend(pending.drain(..).map(|name| (name, Some(ty.clone()))));
            }
            "(" | ")" => {
                return Err(PlanningError::syntax(format!(
                    "unexpected '{}' in typed list of {}",
                    token, context
                )));
            }
            _ => pending.push(token.clone()),
        }
    }

    entries.extend(pending.into_iter().map(|name| (name, None)));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    #[test]
    fn test_split_items_mixes_atoms_and_groups() {
        let tokens = tokenize("- number (at ?x) (f)");
        let items = split_items(&tokens).unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0], Item::Atom("-"));
        assert_eq!(items[1], Item::Atom("number"));
        assert_eq!(items[2].inner().unwrap(), &["at".to_string(), "?x".to_string()]);
        assert_eq!(items[3].inner().unwrap(), &["f".to_string()]);
    }

    #[test]
    fn test_unbalanced_input_rejected() {
        assert!(split_items(&tokenize("(a (b)")).is_err());
        assert!(split_items(&tokenize("a) (b)")).is_err());
    }

    #[test]
    fn test_split_groups_rejects_atoms() {
        let tokens = tokenize("(a) b");
        assert!(matches!(
            split_groups(&tokens, "predicates"),
            Err(PlanningError::Syntax(_))
        ));
    }

    #[test]
    fn test_typed_list_grouped_and_untyped() {
        let tokens = tokenize("a b - t c - u d");
        let entries = typed_list(&tokens, "types").unwrap();
        assert_eq!(
            entries,
            vec![
                ("a".to_string(), Some("t".to_string())),
                ("b".to_string(), Some("t".to_string())),
                ("c".to_string(), Some("u".to_string())),
                ("d".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_typed_list_rejects_dangling_separator() {
        assert!(typed_list(&tokenize("a -"), "objects").is_err());
        assert!(typed_list(&tokenize("- t"), "objects").is_err());
        assert!(matches!(
            typed_list(&tokenize("a - (either t u)"), "objects"),
            Err(PlanningError::Unsupported(_))
        ));
    }
}
