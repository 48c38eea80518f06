//! Directory scopes
//!
//! Every processed script directory gets a [`Directory`] holding its own copy of the
//! variables visible when it was entered. Directories live in a [`DirectoryList`] arena
//! keyed by source path and refer to their parent by [`DirectoryId`]; the
//! [`DirectoryStack`] records which of them are live, innermost last.

use super::error::{ModelError, ModelResult};
use super::variables::VariableList;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};
use std::path::{Path, PathBuf};

/// Handle of a directory in its [`DirectoryList`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct DirectoryId(usize);

impl DirectoryId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Directory {
    source_dir: PathBuf,
    binary_dir: PathBuf,
    variables: VariableList,
    parent: Option<DirectoryId>,
}

impl Directory {
    /// A directory scope starting from a snapshot of `variables`
    pub fn new(
        source_dir: impl Into<PathBuf>,
        binary_dir: impl Into<PathBuf>,
        variables: VariableList,
        parent: Option<DirectoryId>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            binary_dir: binary_dir.into(),
            variables,
            parent,
        }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn binary_dir(&self) -> &Path {
        &self.binary_dir
    }

    pub fn variables(&self) -> &VariableList {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut VariableList {
        &mut self.variables
    }

    pub fn parent(&self) -> Option<DirectoryId> {
        self.parent
    }
}

/// Arena of every directory seen, keyed by source path
#[derive(Debug, Clone, Default)]
pub struct DirectoryList {
    directories: Vec<Directory>,
    by_path: BTreeMap<PathBuf, DirectoryId>,
}

impl DirectoryList {
    pub fn new() -> Self {
        Self::default()
    }

    /// A list holding only `root`, with the root's handle
    pub fn with_root(mut root: Directory) -> (Self, DirectoryId) {
        root.parent = None;
        let id = DirectoryId(0);
        let list = Self {
            by_path: BTreeMap::from([(root.source_dir.clone(), id)]),
            directories: vec![root],
        };
        (list, id)
    }

    /// Register `directory`.
    ///
    /// Only one directory may lack a parent, and a parent must be registered before its
    /// children.
    pub fn add(&mut self, directory: Directory) -> ModelResult<DirectoryId> {
        if self.by_path.contains_key(&directory.source_dir) {
            return Err(ModelError::DuplicateDirectory(directory.source_dir));
        }
        match directory.parent {
            None if self.root().is_some() => {
                return Err(ModelError::SecondRootDirectory(directory.source_dir));
            }
            Some(parent) if parent.0 >= self.directories.len() => {
                return Err(ModelError::UnregisteredParentDirectory(directory.source_dir));
            }
            _ => {}
        }

        let id = DirectoryId(self.directories.len());
        self.by_path.insert(directory.source_dir.clone(), id);
        self.directories.push(directory);
        Ok(id)
    }

    pub fn get(&self, id: DirectoryId) -> Option<&Directory> {
        self.directories.get(id.0)
    }

    pub fn get_mut(&mut self, id: DirectoryId) -> Option<&mut Directory> {
        self.directories.get_mut(id.0)
    }

    pub fn find(&self, source_dir: &Path) -> Option<DirectoryId> {
        self.by_path.get(source_dir).copied()
    }

    /// The parentless directory, if registered
    pub fn root(&self) -> Option<DirectoryId> {
        self.directories
            .iter()
            .position(|d| d.parent.is_none())
            .map(DirectoryId)
    }

    /// Directories in source-path order
    pub fn iter(&self) -> impl Iterator<Item = (DirectoryId, &Directory)> {
        self.by_path
            .values()
            .map(move |id| (*id, &self.directories[id.0]))
    }

    pub fn len(&self) -> usize {
        self.directories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }
}

impl Index<DirectoryId> for DirectoryList {
    type Output = Directory;

    fn index(&self, id: DirectoryId) -> &Directory {
        &self.directories[id.0]
    }
}

impl IndexMut<DirectoryId> for DirectoryList {
    fn index_mut(&mut self, id: DirectoryId) -> &mut Directory {
        &mut self.directories[id.0]
    }
}

/// Serialized as a sequence in source-path order
impl Serialize for DirectoryList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for (_, directory) in self.iter() {
            seq.serialize_element(directory)?;
        }
        seq.end()
    }
}

/// Live directory scopes, innermost last
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryStack {
    stack: Vec<DirectoryId>,
}

impl DirectoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: DirectoryId) {
        self.stack.push(id);
    }

    pub fn pop(&mut self) -> Option<DirectoryId> {
        self.stack.pop()
    }

    /// Innermost live scope
    pub fn current(&self) -> Option<DirectoryId> {
        self.stack.last().copied()
    }

    /// Scope one level above the current one; the root for the root itself
    pub fn enclosing(&self) -> Option<DirectoryId> {
        match self.stack.len() {
            0 => None,
            1 => self.stack.first().copied(),
            n => self.stack.get(n - 2).copied(),
        }
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
