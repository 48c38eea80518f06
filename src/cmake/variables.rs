//! Ordinary variables and cache entries
//!
//! Both lists are ordered by name. A [`VariableList`] belongs to exactly one
//! [`Directory`](super::directory::Directory) scope (plus the single environment list of
//! the model); the one [`TypedVariableList`] is the model's global cache.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::ops::{BitOr, BitOrAssign};

/// A `(name, value)` binding
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Variable {
    name: String,
    value: String,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Name-ordered set of [`Variable`]s
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableList {
    variables: BTreeMap<String, Variable>,
}

impl VariableList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Value of `name`, empty if unset
    pub fn value(&self, name: &str) -> &str {
        self.find(name).map(Variable::value).unwrap_or("")
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.variables
            .insert(name.clone(), Variable::new(name, value));
    }

    pub fn unset(&mut self, name: &str) -> Option<Variable> {
        self.variables.remove(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }
}

impl Serialize for VariableList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.variables.len()))?;
        for variable in self.variables.values() {
            map.serialize_entry(variable.name(), variable.value())?;
        }
        map.end()
    }
}

/// A cache entry: `(name, type, value, description)`.
///
/// The type tag is free-form (`STRING`, `BOOL`, `FILEPATH`, `INTERNAL`, ...).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TypedVariable {
    #[serde(skip)]
    name: String,
    #[serde(rename = "type")]
    type_tag: String,
    value: String,
    description: String,
}

impl TypedVariable {
    pub fn new(
        name: impl Into<String>,
        type_tag: impl Into<String>,
        value: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_tag: type_tag.into(),
            value: value.into(),
            description: description.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Name-ordered set of [`TypedVariable`]s
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypedVariableList {
    variables: BTreeMap<String, TypedVariable>,
}

impl TypedVariableList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, name: &str) -> Option<&TypedVariable> {
        self.variables.get(name)
    }

    pub fn value(&self, name: &str) -> &str {
        self.find(name).map(TypedVariable::value).unwrap_or("")
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Insert or replace the entry named by `variable`
    pub fn set(&mut self, variable: TypedVariable) {
        self.variables.insert(variable.name.clone(), variable);
    }

    pub fn unset(&mut self, name: &str) -> Option<TypedVariable> {
        self.variables.remove(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypedVariable> {
        self.variables.values()
    }
}

impl Serialize for TypedVariableList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.variables.len()))?;
        for (name, variable) in &self.variables {
            map.serialize_entry(name, variable)?;
        }
        map.end()
    }
}

/// How a `set`/`unset` is applied: combination of `CACHE`, `PARENT_SCOPE` and `FORCE`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VariableAttributes(u8);

impl VariableAttributes {
    pub const NONE: Self = Self(0);
    pub const CACHE: Self = Self(1);
    pub const PARENT_SCOPE: Self = Self(1 << 1);
    pub const FORCE: Self = Self(1 << 2);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for VariableAttributes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for VariableAttributes {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_unset() {
        let mut list = VariableList::new();
        list.set("X", "1");
        assert_eq!(list.value("X"), "1");
        list.set("X", "2");
        assert_eq!(list.value("X"), "2");
        assert_eq!(list.len(), 1);

        assert_eq!(list.unset("X"), Some(Variable::new("X", "2")));
        assert_eq!(list.value("X"), "");
        assert!(list.find("X").is_none());
    }

    #[test]
    fn test_iteration_is_name_ordered() {
        let mut list = VariableList::new();
        list.set("b", "2");
        list.set("a", "1");
        list.set("c", "3");
        let names: Vec<_> = list.iter().map(Variable::name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_copies_are_independent() {
        let mut parent = VariableList::new();
        parent.set("A", "1");
        let mut child = parent.clone();
        child.set("A", "2");
        child.set("B", "3");
        assert_eq!(parent.value("A"), "1");
        assert!(!parent.contains("B"));
    }

    #[test]
    fn test_typed_list() {
        let mut cache = TypedVariableList::new();
        cache.set(TypedVariable::new("OPT", "BOOL", "ON", "an option"));
        let entry = cache.find("OPT").unwrap();
        assert_eq!(entry.type_tag(), "BOOL");
        assert_eq!(entry.description(), "an option");
        assert_eq!(cache.value("OPT"), "ON");
        assert_eq!(cache.value("MISSING"), "");
    }

    #[test]
    fn test_attributes() {
        let attrs = VariableAttributes::CACHE | VariableAttributes::FORCE;
        assert!(attrs.contains(VariableAttributes::CACHE));
        assert!(attrs.contains(VariableAttributes::FORCE));
        assert!(!attrs.contains(VariableAttributes::PARENT_SCOPE));
        assert!(VariableAttributes::NONE.is_empty());
        assert!(attrs.contains(VariableAttributes::NONE));
    }
}
