//! Projects declared by `project()`
//!
//! Projects form a tree: the first parentless project is the main project and every other
//! project names its parent by [`ProjectId`]. Each project owns the targets declared in its
//! scope.

use super::error::{ModelError, ModelResult};
use super::target::TargetList;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};
use std::path::{Path, PathBuf};

/// Handle of a project in its [`ProjectList`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct ProjectId(usize);

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Project {
    name: String,
    version: String,
    description: String,
    languages: Vec<String>,
    homepage_url: String,
    source_dir: PathBuf,
    binary_dir: PathBuf,
    parent: Option<ProjectId>,
    targets: TargetList,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: String::new(),
            description: String::new(),
            languages: Vec::new(),
            homepage_url: String::new(),
            source_dir: PathBuf::new(),
            binary_dir: PathBuf::new(),
            parent: None,
            targets: TargetList::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_homepage_url(mut self, url: impl Into<String>) -> Self {
        self.homepage_url = url.into();
        self
    }

    pub fn with_directories(
        mut self,
        source_dir: impl Into<PathBuf>,
        binary_dir: impl Into<PathBuf>,
    ) -> Self {
        self.source_dir = source_dir.into();
        self.binary_dir = binary_dir.into();
        self
    }

    pub fn with_parent(mut self, parent: Option<ProjectId>) -> Self {
        self.parent = parent;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn homepage_url(&self) -> &str {
        &self.homepage_url
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn binary_dir(&self) -> &Path {
        &self.binary_dir
    }

    pub fn parent(&self) -> Option<ProjectId> {
        self.parent
    }

    pub fn targets(&self) -> &TargetList {
        &self.targets
    }

    pub fn targets_mut(&mut self) -> &mut TargetList {
        &mut self.targets
    }
}

/// Split a dotted version into major, minor, patch and tweak; missing parts are `"0"`
pub fn split_version(version: &str) -> [String; 4] {
    let mut parts = version.split('.').map(str::trim);
    std::array::from_fn(|_| match parts.next() {
        Some(part) if !part.is_empty() => part.to_string(),
        _ => "0".to_string(),
    })
}

/// Arena of projects, unique by name
#[derive(Debug, Clone, Default)]
pub struct ProjectList {
    projects: Vec<Project>,
    by_name: BTreeMap<String, ProjectId>,
}

impl ProjectList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, project: Project) -> ModelResult<ProjectId> {
        if self.by_name.contains_key(project.name()) {
            return Err(ModelError::DuplicateProject(project.name));
        }
        match project.parent {
            None if self.main().is_some() => {
                return Err(ModelError::SecondMainProject(project.name));
            }
            Some(parent) if parent.0 >= self.projects.len() => {
                return Err(ModelError::UnregisteredParentProject(project.name));
            }
            _ => {}
        }

        let id = ProjectId(self.projects.len());
        self.by_name.insert(project.name.clone(), id);
        self.projects.push(project);
        Ok(id)
    }

    /// The parentless project
    pub fn main(&self) -> Option<ProjectId> {
        self.projects
            .iter()
            .position(|p| p.parent.is_none())
            .map(ProjectId)
    }

    pub fn get(&self, id: ProjectId) -> Option<&Project> {
        self.projects.get(id.0)
    }

    pub fn get_mut(&mut self, id: ProjectId) -> Option<&mut Project> {
        self.projects.get_mut(id.0)
    }

    pub fn find(&self, name: &str) -> Option<ProjectId> {
        self.by_name.get(name).copied()
    }

    /// Projects in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (ProjectId, &Project)> {
        self.projects
            .iter()
            .enumerate()
            .map(|(index, project)| (ProjectId(index), project))
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

/// Serialized as a sequence in declaration order
impl Serialize for ProjectList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for (_, project) in self.iter() {
            seq.serialize_element(project)?;
        }
        seq.end()
    }
}

impl Index<ProjectId> for ProjectList {
    type Output = Project;

    fn index(&self, id: ProjectId) -> &Project {
        &self.projects[id.0]
    }
}

impl IndexMut<ProjectId> for ProjectList {
    fn index_mut(&mut self, id: ProjectId) -> &mut Project {
        &mut self.projects[id.0]
    }
}
