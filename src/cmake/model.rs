//! Interpreter state
//!
//! [`CMakeModel`] is everything a script run can change: the directory scopes and the
//! stack of live ones, the global cache, the environment, the project and target
//! registries and the messages the script emitted.
//!
//! Scope rules
//!
//!     Plain variable operations act on the innermost live directory scope. Entering a
//!     directory snapshots the current scope into the new one, so nothing a child does is
//!     visible to its parent after it is left, unless the child explicitly writes with
//!     [`VariableAttributes::PARENT_SCOPE`]. The cache and the environment are global and
//!     ignore scoping entirely.
//!
//!     The root directory is registered and entered on construction and can never be left,
//!     so there is always a current scope.

use super::directory::{Directory, DirectoryId, DirectoryList, DirectoryStack};
use super::error::{ModelError, ModelResult};
use super::message::Message;
use super::project::{split_version, Project, ProjectId, ProjectList};
use super::target::Target;
use super::variables::{TypedVariable, TypedVariableList, Variable, VariableAttributes, VariableList};
use crate::config::ModelSettings;
use std::path::{Path, PathBuf};

/// Version of the build tool whose behavior the model reproduces
pub const EMULATED_VERSION: &str = "3.28.3";

#[derive(Debug, Clone, serde::Serialize)]
pub struct CMakeModel {
    directories: DirectoryList,
    #[serde(skip)]
    stack: DirectoryStack,
    #[serde(skip)]
    root: DirectoryId,
    cache: TypedVariableList,
    environment: VariableList,
    projects: ProjectList,
    messages: Vec<Message>,
}

impl CMakeModel {
    /// A fresh model for a tree rooted at `source_dir`, built into `binary_dir`
    pub fn new(
        source_dir: impl Into<PathBuf>,
        binary_dir: impl Into<PathBuf>,
        settings: &ModelSettings,
    ) -> Self {
        let source_dir = source_dir.into();
        let binary_dir = binary_dir.into();

        let (directories, root) = DirectoryList::with_root(Directory::new(
            source_dir.clone(),
            binary_dir.clone(),
            builtin_variables(&source_dir, &binary_dir, settings),
            None,
        ));
        let mut stack = DirectoryStack::new();
        stack.push(root);

        let mut cache = TypedVariableList::new();
        cache.set(TypedVariable::new(
            "CMAKE_MAKE_PROGRAM",
            "FILEPATH",
            settings.make_program.as_str(),
            "Path to a program.",
        ));
        cache.set(TypedVariable::new(
            "CMAKE_BUILD_TYPE",
            "STRING",
            settings.build_type.as_str(),
            "Choose the type of build.",
        ));

        let mut environment = VariableList::new();
        if settings.import_environment {
            for (name, value) in std::env::vars() {
                environment.set(name, value);
            }
        }

        Self {
            directories,
            stack,
            root,
            cache,
            environment,
            projects: ProjectList::new(),
            messages: Vec::new(),
        }
    }

    /// A model seeded with the default settings
    pub fn with_defaults(source_dir: impl Into<PathBuf>, binary_dir: impl Into<PathBuf>) -> Self {
        Self::new(source_dir, binary_dir, &ModelSettings::default())
    }

    // Scoped variables

    fn current_id(&self) -> DirectoryId {
        self.stack.current().unwrap_or(self.root)
    }

    fn scope(&self) -> &VariableList {
        self.directories[self.current_id()].variables()
    }

    fn scope_mut(&mut self) -> &mut VariableList {
        let id = self.current_id();
        self.directories[id].variables_mut()
    }

    fn enclosing_scope_mut(&mut self) -> &mut VariableList {
        let id = self.stack.enclosing().unwrap_or(self.root);
        self.directories[id].variables_mut()
    }

    /// Variables of the current scope
    pub fn variables(&self) -> &VariableList {
        self.scope()
    }

    pub fn find_variable(&self, name: &str) -> Option<&Variable> {
        self.scope().find(name)
    }

    /// Value in the current scope, empty if unset
    pub fn get_variable(&self, name: &str) -> &str {
        self.scope().value(name)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.scope_mut().set(name, value);
    }

    pub fn unset_variable(&mut self, name: &str) {
        self.scope_mut().unset(name);
    }

    /// Set with `CACHE`, `PARENT_SCOPE` and `FORCE` semantics.
    ///
    /// - `CACHE` without `FORCE` creates the cache entry only if it does not exist yet
    /// - `CACHE | FORCE` always overwrites type, value and description
    /// - `PARENT_SCOPE` writes to the enclosing scope (the root scope at the root)
    /// - no attributes is a plain scoped set
    pub fn set_variable_with(
        &mut self,
        name: &str,
        value: &str,
        attributes: VariableAttributes,
        type_tag: &str,
        description: &str,
    ) {
        if attributes.contains(VariableAttributes::CACHE) {
            if attributes.contains(VariableAttributes::FORCE) || !self.cache.contains(name) {
                self.cache
                    .set(TypedVariable::new(name, type_tag, value, description));
            }
        } else if attributes.contains(VariableAttributes::PARENT_SCOPE) {
            self.enclosing_scope_mut().set(name, value);
        } else {
            self.scope_mut().set(name, value);
        }
    }

    /// Unset with `CACHE` or `PARENT_SCOPE` semantics
    pub fn unset_variable_with(&mut self, name: &str, attributes: VariableAttributes) {
        if attributes.contains(VariableAttributes::CACHE) {
            self.cache.unset(name);
        } else if attributes.contains(VariableAttributes::PARENT_SCOPE) {
            self.enclosing_scope_mut().unset(name);
        } else {
            self.scope_mut().unset(name);
        }
    }

    /// Scope value, falling back to the cache, empty if neither has `name`
    pub fn resolve_variable(&self, name: &str) -> &str {
        match self.scope().find(name) {
            Some(variable) => variable.value(),
            None => self.cache.value(name),
        }
    }

    // Cache

    pub fn cache(&self) -> &TypedVariableList {
        &self.cache
    }

    pub fn find_cache_variable(&self, name: &str) -> Option<&TypedVariable> {
        self.cache.find(name)
    }

    pub fn get_cache_variable(&self, name: &str) -> &str {
        self.cache.value(name)
    }

    // Environment

    pub fn environment(&self) -> &VariableList {
        &self.environment
    }

    pub fn get_environment_variable(&self, name: &str) -> &str {
        self.environment.value(name)
    }

    pub fn set_environment_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.environment.set(name, value);
    }

    pub fn unset_environment_variable(&mut self, name: &str) {
        self.environment.unset(name);
    }

    // Directories

    pub fn directories(&self) -> &DirectoryList {
        &self.directories
    }

    pub fn root_directory(&self) -> &Directory {
        &self.directories[self.root]
    }

    pub fn current_directory(&self) -> &Directory {
        &self.directories[self.current_id()]
    }

    /// Number of live directory scopes, 1 at the root
    pub fn directory_depth(&self) -> usize {
        self.stack.len()
    }

    /// Open a child scope for `source_dir` and make it current
    pub fn enter_directory(
        &mut self,
        source_dir: impl Into<PathBuf>,
        binary_dir: impl Into<PathBuf>,
    ) -> ModelResult<DirectoryId> {
        let source_dir = source_dir.into();
        let binary_dir = binary_dir.into();
        let parent = self.current_id();

        let mut variables = self.scope().clone();
        let parent_list_file = variables.value("CMAKE_CURRENT_LIST_FILE").to_string();
        variables.set("CMAKE_PARENT_LIST_FILE", parent_list_file);
        set_current_dirs(&mut variables, &source_dir, &binary_dir);

        let id = self.directories.add(Directory::new(
            source_dir.clone(),
            binary_dir,
            variables,
            Some(parent),
        ))?;
        self.stack.push(id);
        tracing::debug!(dir = %source_dir.display(), depth = self.stack.len(), "enter directory");
        Ok(id)
    }

    /// Close the current scope; the root scope is never closed
    pub fn leave_directory(&mut self) -> Option<DirectoryId> {
        if self.stack.len() <= 1 {
            tracing::warn!("attempt to leave the root directory scope");
            return None;
        }
        let left = self.stack.pop();
        tracing::debug!(depth = self.stack.len(), "leave directory");
        left
    }

    // Projects and targets

    pub fn projects(&self) -> &ProjectList {
        &self.projects
    }

    pub fn get_project(&self, name: &str) -> Option<&Project> {
        self.projects.find(name).map(|id| &self.projects[id])
    }

    pub fn main_project(&self) -> Option<&Project> {
        self.projects.main().map(|id| &self.projects[id])
    }

    /// Project owning the current scope (named by `PROJECT_NAME`)
    pub fn current_project(&self) -> Option<ProjectId> {
        self.projects.find(self.get_variable("PROJECT_NAME"))
    }

    /// Register `project` and publish its `PROJECT_*` and `<name>_*` variables
    pub fn add_project(&mut self, project: Project) -> ModelResult<ProjectId> {
        let id = self.projects.add(project)?;
        let project = self.projects[id].clone();
        let is_top_level = project.parent().is_none();
        let name = project.name();

        let version = project.version();
        let components = if version.is_empty() {
            Default::default()
        } else {
            split_version(version)
        };
        let source_dir = project.source_dir().display().to_string();
        let binary_dir = project.binary_dir().display().to_string();
        let top_level = if is_top_level { "ON" } else { "OFF" };

        let values: [(&str, &str); 10] = [
            ("VERSION", version),
            ("VERSION_MAJOR", &components[0]),
            ("VERSION_MINOR", &components[1]),
            ("VERSION_PATCH", &components[2]),
            ("VERSION_TWEAK", &components[3]),
            ("SOURCE_DIR", &source_dir),
            ("BINARY_DIR", &binary_dir),
            ("DESCRIPTION", project.description()),
            ("HOMEPAGE_URL", project.homepage_url()),
            ("IS_TOP_LEVEL", top_level),
        ];

        let scope = self.scope_mut();
        scope.set("PROJECT_NAME", name);
        for (suffix, value) in values {
            scope.set(format!("PROJECT_{suffix}"), value);
            scope.set(format!("{name}_{suffix}"), value);
        }
        if is_top_level {
            scope.set("CMAKE_PROJECT_NAME", name);
            for suffix in ["VERSION", "DESCRIPTION", "HOMEPAGE_URL"] {
                let value = scope.value(&format!("PROJECT_{suffix}")).to_string();
                scope.set(format!("CMAKE_PROJECT_{suffix}"), value);
            }
        }

        tracing::debug!(project = name, version, top_level = is_top_level, "project added");
        Ok(id)
    }

    /// The target named `name` and the project owning it
    pub fn find_target(&self, name: &str) -> Option<(&Project, &Target)> {
        self.projects
            .iter()
            .find_map(|(_, project)| project.targets().find(name).map(|t| (project, t)))
    }

    /// Attach `target` to the current project.
    ///
    /// Target names are unique across all projects and an alias must name an existing
    /// target.
    pub fn add_target(&mut self, target: Target) -> ModelResult<()> {
        let Some(project) = self.current_project() else {
            return Err(ModelError::TargetWithoutProject(target.name().to_string()));
        };
        if self.find_target(target.name()).is_some() {
            return Err(ModelError::DuplicateTarget(target.name().to_string()));
        }
        if let Some(aliased) = target.alias_target() {
            if self.find_target(aliased).is_none() {
                return Err(ModelError::UnknownAliasTarget {
                    alias: target.name().to_string(),
                    target: aliased.to_string(),
                });
            }
        }
        tracing::debug!(target = target.name(), kind = %target.kind(), "target added");
        self.projects[project].targets_mut().add(target)
    }

    // Messages

    pub fn record_message(&mut self, message: Message) {
        message.log();
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

fn set_current_dirs(variables: &mut VariableList, source_dir: &Path, binary_dir: &Path) {
    let source = source_dir.display().to_string();
    variables.set("CMAKE_CURRENT_SOURCE_DIR", source.as_str());
    variables.set("CMAKE_CURRENT_LIST_DIR", source);
    variables.set("CMAKE_CURRENT_BINARY_DIR", binary_dir.display().to_string());
}

fn builtin_variables(source_dir: &Path, binary_dir: &Path, settings: &ModelSettings) -> VariableList {
    let mut variables = VariableList::new();
    variables.set("CMAKE_SOURCE_DIR", source_dir.display().to_string());
    variables.set("CMAKE_BINARY_DIR", binary_dir.display().to_string());
    set_current_dirs(&mut variables, source_dir, binary_dir);

    variables.set("CMAKE_COMMAND", "cmake");
    variables.set("CMAKE_VERSION", EMULATED_VERSION);
    let [major, minor, patch, tweak] = split_version(EMULATED_VERSION);
    variables.set("CMAKE_MAJOR_VERSION", major);
    variables.set("CMAKE_MINOR_VERSION", minor);
    variables.set("CMAKE_PATCH_VERSION", patch);
    variables.set("CMAKE_TWEAK_VERSION", tweak);
    variables.set("CMAKE_GENERATOR", settings.generator.as_str());
    variables.set("CMAKE_MAKE_PROGRAM", settings.make_program.as_str());

    let system = host_system_name();
    variables.set("CMAKE_HOST_SYSTEM_NAME", system);
    variables.set("CMAKE_SYSTEM_NAME", system);
    if cfg!(unix) {
        variables.set("UNIX", "1");
        variables.set("CMAKE_HOST_UNIX", "1");
    }
    if cfg!(windows) {
        variables.set("WIN32", "1");
        variables.set("CMAKE_HOST_WIN32", "1");
    }
    if cfg!(target_os = "macos") {
        variables.set("APPLE", "1");
        variables.set("CMAKE_HOST_APPLE", "1");
    }
    variables
}

fn host_system_name() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "macos" => "Darwin",
        "windows" => "Windows",
        "freebsd" => "FreeBSD",
        "netbsd" => "NetBSD",
        "openbsd" => "OpenBSD",
        "android" => "Android",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmake::target::TargetKind;
    use proptest::prelude::*;

    fn model() -> CMakeModel {
        let settings = ModelSettings {
            import_environment: false,
            ..ModelSettings::default()
        };
        CMakeModel::new("/src", "/build", &settings)
    }

    #[test]
    fn test_builtin_variables() {
        let model = model();
        assert_eq!(model.get_variable("CMAKE_SOURCE_DIR"), "/src");
        assert_eq!(model.get_variable("CMAKE_CURRENT_BINARY_DIR"), "/build");
        assert_eq!(model.get_variable("CMAKE_GENERATOR"), "Unix Makefiles");
        assert_eq!(model.get_variable("CMAKE_MAJOR_VERSION"), "3");
        assert_eq!(model.get_cache_variable("CMAKE_MAKE_PROGRAM"), "make");
        assert_eq!(model.directory_depth(), 1);
        assert!(model.environment().is_empty());
    }

    #[test]
    fn test_cache_force_law() {
        let mut model = model();
        model.set_variable_with("X", "a", VariableAttributes::CACHE, "STRING", "first");
        model.set_variable_with("X", "b", VariableAttributes::CACHE, "BOOL", "second");
        assert_eq!(model.get_cache_variable("X"), "a");
        assert_eq!(model.find_cache_variable("X").unwrap().type_tag(), "STRING");

        model.set_variable_with(
            "X",
            "b",
            VariableAttributes::CACHE | VariableAttributes::FORCE,
            "BOOL",
            "second",
        );
        let entry = model.find_cache_variable("X").unwrap();
        assert_eq!(entry.value(), "b");
        assert_eq!(entry.type_tag(), "BOOL");
        assert_eq!(entry.description(), "second");
        assert!(model.find_variable("X").is_none());
    }

    #[test]
    fn test_resolve_falls_back_to_cache() {
        let mut model = model();
        model.set_variable_with("C", "cached", VariableAttributes::CACHE, "STRING", "");
        assert_eq!(model.resolve_variable("C"), "cached");
        model.set_variable("C", "scoped");
        assert_eq!(model.resolve_variable("C"), "scoped");
        assert_eq!(model.resolve_variable("NOPE"), "");
    }

    #[test]
    fn test_directory_scope_isolation() {
        let mut model = model();
        model.set_variable("A", "root");
        model.enter_directory("/src/sub", "/build/sub").unwrap();
        assert_eq!(model.get_variable("A"), "root");
        assert_eq!(model.get_variable("CMAKE_CURRENT_SOURCE_DIR"), "/src/sub");

        model.set_variable("Y", "child");
        model.set_variable("A", "changed");
        model.leave_directory();

        assert!(model.find_variable("Y").is_none());
        assert_eq!(model.get_variable("A"), "root");
        assert_eq!(model.get_variable("CMAKE_CURRENT_SOURCE_DIR"), "/src");
        assert_eq!(model.directories().len(), 2);
    }

    #[test]
    fn test_parent_scope() {
        let mut model = model();
        model.enter_directory("/src/a", "/build/a").unwrap();
        model.enter_directory("/src/a/b", "/build/a/b").unwrap();
        model.set_variable_with("P", "up", VariableAttributes::PARENT_SCOPE, "", "");
        assert!(model.find_variable("P").is_none());
        model.leave_directory();
        assert_eq!(model.get_variable("P"), "up");
        model.leave_directory();
        assert!(model.find_variable("P").is_none());

        model.set_variable_with("R", "root", VariableAttributes::PARENT_SCOPE, "", "");
        assert_eq!(model.get_variable("R"), "root");
        model.unset_variable_with("R", VariableAttributes::PARENT_SCOPE);
        assert!(model.find_variable("R").is_none());
    }

    #[test]
    fn test_root_is_never_left() {
        let mut model = model();
        assert_eq!(model.leave_directory(), None);
        assert_eq!(model.directory_depth(), 1);
    }

    #[test]
    fn test_environment_is_global() {
        let mut model = model();
        model.set_environment_variable("E", "1");
        model.enter_directory("/src/sub", "/build/sub").unwrap();
        model.set_environment_variable("F", "2");
        model.leave_directory();
        assert_eq!(model.get_environment_variable("E"), "1");
        assert_eq!(model.get_environment_variable("F"), "2");
        model.unset_environment_variable("E");
        assert_eq!(model.get_environment_variable("E"), "");
    }

    #[test]
    fn test_add_project_publishes_variables() {
        let mut model = model();
        let project = Project::new("Foo")
            .with_version("1.2.3.4")
            .with_description("d")
            .with_directories("/src", "/build");
        model.add_project(project).unwrap();

        assert_eq!(model.get_project("Foo").unwrap().version(), "1.2.3.4");
        assert_eq!(model.get_variable("PROJECT_NAME"), "Foo");
        assert_eq!(model.get_variable("PROJECT_VERSION_MAJOR"), "1");
        assert_eq!(model.get_variable("PROJECT_VERSION_MINOR"), "2");
        assert_eq!(model.get_variable("PROJECT_VERSION_PATCH"), "3");
        assert_eq!(model.get_variable("PROJECT_VERSION_TWEAK"), "4");
        assert_eq!(model.get_variable("Foo_VERSION"), "1.2.3.4");
        assert_eq!(model.get_variable("Foo_SOURCE_DIR"), "/src");
        assert_eq!(model.get_variable("PROJECT_DESCRIPTION"), "d");
        assert_eq!(model.get_variable("PROJECT_IS_TOP_LEVEL"), "ON");
        assert_eq!(model.get_variable("CMAKE_PROJECT_NAME"), "Foo");
        assert_eq!(model.get_variable("CMAKE_PROJECT_VERSION"), "1.2.3.4");
    }

    #[test]
    fn test_project_without_version() {
        let mut model = model();
        model.add_project(Project::new("Bare")).unwrap();
        assert_eq!(model.get_variable("PROJECT_VERSION"), "");
        assert_eq!(model.get_variable("PROJECT_VERSION_MAJOR"), "");
    }

    #[test]
    fn test_targets_attach_to_current_project() {
        let mut model = model();
        assert_eq!(
            model.add_target(Target::new("early", TargetKind::Executable)),
            Err(ModelError::TargetWithoutProject("early".to_string()))
        );

        model.add_project(Project::new("Top")).unwrap();
        model
            .add_target(Target::new("lib", TargetKind::StaticLibrary))
            .unwrap();
        model.add_target(Target::alias("Top::lib", "lib")).unwrap();
        assert_eq!(
            model.add_target(Target::alias("Top::nope", "nope")),
            Err(ModelError::UnknownAliasTarget {
                alias: "Top::nope".to_string(),
                target: "nope".to_string(),
            })
        );

        let (project, target) = model.find_target("lib").unwrap();
        assert_eq!(project.name(), "Top");
        assert_eq!(target.kind(), TargetKind::StaticLibrary);
        assert_eq!(model.main_project().unwrap().targets().len(), 2);
    }

    proptest! {
        #[test]
        fn prop_set_then_get(name in "[A-Za-z_][A-Za-z0-9_]{0,16}", value in ".*") {
            let mut model = model();
            model.set_variable(name.clone(), value.clone());
            prop_assert_eq!(model.get_variable(&name), value.as_str());
            model.unset_variable(&name);
            prop_assert_eq!(model.get_variable(&name), "");
            prop_assert!(model.find_variable(&name).is_none());
        }
    }
}
