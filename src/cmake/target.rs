//! Build targets declared by `add_executable` and `add_library`

use super::error::{ModelError, ModelResult};
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Executable,
    StaticLibrary,
    SharedLibrary,
    ObjectLibrary,
    Alias,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetKind::Executable => "executable",
            TargetKind::StaticLibrary => "static library",
            TargetKind::SharedLibrary => "shared library",
            TargetKind::ObjectLibrary => "object library",
            TargetKind::Alias => "alias",
        };
        f.write_str(name)
    }
}

/// Target flags given in the declaring command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TargetAttributes(u8);

impl TargetAttributes {
    pub const NONE: Self = Self(0);
    pub const WIN32_EXE: Self = Self(1);
    pub const MACOSX_BUNDLE: Self = Self(1 << 1);
    pub const EXCLUDE_FROM_ALL: Self = Self(1 << 2);
    pub const IMPORTED: Self = Self(1 << 3);
    pub const GLOBAL: Self = Self(1 << 4);
    pub const ALIAS: Self = Self(1 << 5);

    const NAMES: [(Self, &'static str); 6] = [
        (Self::WIN32_EXE, "WIN32"),
        (Self::MACOSX_BUNDLE, "MACOSX_BUNDLE"),
        (Self::EXCLUDE_FROM_ALL, "EXCLUDE_FROM_ALL"),
        (Self::IMPORTED, "IMPORTED"),
        (Self::GLOBAL, "GLOBAL"),
        (Self::ALIAS, "ALIAS"),
    ];

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Keyword spelling of each set flag
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }

    /// Flag spelled by a command keyword
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(_, name)| *name == keyword)
            .map(|(flag, _)| *flag)
    }
}

impl BitOr for TargetAttributes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TargetAttributes {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl Serialize for TargetAttributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let names = self.names();
        let mut seq = serializer.serialize_seq(Some(names.len()))?;
        for name in names {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Target {
    name: String,
    kind: TargetKind,
    attributes: TargetAttributes,
    sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alias_target: Option<String>,
}

impl Target {
    pub fn new(name: impl Into<String>, kind: TargetKind) -> Self {
        Self {
            name: name.into(),
            kind,
            attributes: TargetAttributes::NONE,
            sources: Vec::new(),
            alias_target: None,
        }
    }

    /// An alias for `target`
    pub fn alias(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            attributes: TargetAttributes::ALIAS,
            alias_target: Some(target.into()),
            ..Self::new(name, TargetKind::Alias)
        }
    }

    pub fn with_attributes(mut self, attributes: TargetAttributes) -> Self {
        self.attributes |= attributes;
        self
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn attributes(&self) -> TargetAttributes {
        self.attributes
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn alias_target(&self) -> Option<&str> {
        self.alias_target.as_deref()
    }
}

/// Targets owned by one project, ordered by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetList {
    targets: BTreeMap<String, Target>,
}

impl TargetList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, target: Target) -> ModelResult<()> {
        if self.targets.contains_key(target.name()) {
            return Err(ModelError::DuplicateTarget(target.name));
        }
        self.targets.insert(target.name.clone(), target);
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&Target> {
        self.targets.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl Serialize for TargetList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.targets.len()))?;
        for target in self.targets.values() {
            seq.serialize_element(target)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_names() {
        let attrs = TargetAttributes::WIN32_EXE | TargetAttributes::EXCLUDE_FROM_ALL;
        assert_eq!(attrs.names(), vec!["WIN32", "EXCLUDE_FROM_ALL"]);
        assert_eq!(
            TargetAttributes::from_keyword("IMPORTED"),
            Some(TargetAttributes::IMPORTED)
        );
        assert_eq!(TargetAttributes::from_keyword("STATIC"), None);
    }

    #[test]
    fn test_alias_target() {
        let alias = Target::alias("Foo::lib", "lib");
        assert_eq!(alias.kind(), TargetKind::Alias);
        assert!(alias.attributes().contains(TargetAttributes::ALIAS));
        assert_eq!(alias.alias_target(), Some("lib"));
    }

    #[test]
    fn test_duplicate_target_rejected() {
        let mut list = TargetList::new();
        list.add(Target::new("app", TargetKind::Executable)).unwrap();
        assert_eq!(
            list.add(Target::new("app", TargetKind::StaticLibrary)),
            Err(ModelError::DuplicateTarget("app".to_string()))
        );
        assert_eq!(list.len(), 1);
    }
}
