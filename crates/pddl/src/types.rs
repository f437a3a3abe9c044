//! TypeHierarchy and ObjectTable - type closure and typed object registries

use shared::{PlanningError, Result, UnknownTypeError};
use std::collections::{BTreeMap, BTreeSet};

/// Root of every type hierarchy
pub const ROOT_TYPE: &str = "object";

/// Supertype relation between declared types
///
/// Every declared type has exactly one parent; `object` is the implicit root
/// and is always known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeHierarchy {
    /// child -> parent
    parents: BTreeMap<String, String>,
}

impl TypeHierarchy {
    /// Create a hierarchy containing only `object`
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a type has been declared
    pub fn is_known(&self, ty: &str) -> bool {
        ty == ROOT_TYPE || self.parents.contains_key(ty)
    }

    /// Fail with `UnknownTypeError` unless the type is known
    pub fn require(&self, ty: &str, context: &str) -> Result<()> {
        if self.is_known(ty) {
            return Ok(());
        }
        Err(UnknownTypeError {
            type_name: ty.to_string(),
            context: context.to_string(),
            known_types: self.known_types().into_iter().map(str::to_string).collect(),
        }
        .into())
    }

    /// Bind `child` as a direct subordinate of `parent`.
    ///
    /// An unknown parent is registered under `object` first. Re-declaring a
    /// type moves it under the new parent.
    pub fn declare(&mut self, child: &str, parent: &str) -> Result<()> {
        if child == ROOT_TYPE {
            return Ok(());
        }
        if !self.is_known(parent) {
            self.parents.insert(parent.to_string(), ROOT_TYPE.to_string());
        }
        if self.is_subtype(parent, child) {
            return Err(PlanningError::syntax(format!(
                "type '{}' cannot be a subtype of its own descendant '{}'",
                child, parent
            )));
        }
        self.parents.insert(child.to_string(), parent.to_string());
        Ok(())
    }

    /// Parent of a declared type
    pub fn parent(&self, ty: &str) -> Option<&str> {
        self.parents.get(ty).map(String::as_str)
    }

    /// All known type names, `object` included
    pub fn known_types(&self) -> Vec<&str> {
        std::iter::once(ROOT_TYPE)
            .chain(self.parents.keys().map(String::as_str))
            .collect()
    }

    /// Supertype -> direct subordinates, for every type that has any
    pub fn subtypes(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut children: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (child, parent) in &self.parents {
            children.entry(parent.as_str()).or_default().push(child.as_str());
        }
        children
    }

    /// Whether the hierarchy has more than the root
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// True when `ty` equals `ancestor` or descends from it
    pub fn is_subtype(&self, ty: &str, ancestor: &str) -> bool {
        if ancestor == ROOT_TYPE {
            return self.is_known(ty);
        }
        let mut current = Some(ty);
        let mut steps = 0;
        while let Some(t) = current {
            if t == ancestor {
                return true;
            }
            // Guards against malformed maps; declare() rejects cycles.
            steps += 1;
            if steps > self.parents.len() + 1 {
                return false;
            }
            current = self.parent(t);
        }
        false
    }

    /// The type itself plus every transitive subordinate
    pub fn descendants(&self, ty: &str) -> BTreeSet<String> {
        let children = self.subtypes();
        let mut selected = BTreeSet::new();
        let mut frontier = vec![ty.to_string()];
        while let Some(t) = frontier.pop() {
            if !selected.insert(t.clone()) {
                continue;
            }
            if let Some(subs) = children.get(t.as_str()) {
                frontier.extend(subs.iter().map(|s| s.to_string()));
            }
        }
        selected
    }

    /// Objects from the given tables whose type is `ty` or descends from it
    pub fn objects_of_type(&self, ty: &str, tables: &[&ObjectTable]) -> BTreeSet<String> {
        let selected = self.descendants(ty);
        let mut objects = BTreeSet::new();
        for table in tables {
            for t in &selected {
                objects.extend(table.objects_of(t).iter().cloned());
            }
        }
        objects
    }
}

/// Type -> object names, with reverse lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectTable {
    by_type: BTreeMap<String, Vec<String>>,
}

impl ObjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an object. Repeating an identical declaration is a no-op.
    pub fn insert(&mut self, object: &str, ty: &str) -> Result<()> {
        if let Some(existing) = self.type_of(object) {
            if existing == ty {
                return Ok(());
            }
            return Err(PlanningError::syntax(format!(
                "object '{}' declared as both '{}' and '{}'",
                object, existing, ty
            )));
        }
        self.by_type
            .entry(ty.to_string())
            .or_default()
            .push(object.to_string());
        Ok(())
    }

    /// Declared type of an object
    pub fn type_of(&self, object: &str) -> Option<&str> {
        self.by_type
            .iter()
            .find(|(_, objects)| objects.iter().any(|o| o == object))
            .map(|(ty, _)| ty.as_str())
    }

    /// Objects declared with exactly this type
    pub fn objects_of(&self, ty: &str) -> &[String] {
        self.by_type.get(ty).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, object: &str) -> bool {
        self.type_of(object).is_some()
    }

    /// Type -> objects, in type order
    pub fn by_type(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.by_type.iter().map(|(t, o)| (t.as_str(), o.as_slice()))
    }

    /// (object, type) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_type
            .iter()
            .flat_map(|(t, objects)| objects.iter().map(move |o| (o.as_str(), t.as_str())))
    }

    pub fn len(&self) -> usize {
        self.by_type.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}
