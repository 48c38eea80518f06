//! Model invariant violations

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("directory {} is already registered", .0.display())]
    DuplicateDirectory(PathBuf),
    #[error("directory {} has no parent but a root directory already exists", .0.display())]
    SecondRootDirectory(PathBuf),
    #[error("parent of directory {} is not registered", .0.display())]
    UnregisteredParentDirectory(PathBuf),
    #[error("project {0} is already defined")]
    DuplicateProject(String),
    #[error("project {0} has no parent but a main project already exists")]
    SecondMainProject(String),
    #[error("parent of project {0} is not registered")]
    UnregisteredParentProject(String),
    #[error("target {0} is already defined")]
    DuplicateTarget(String),
    #[error("target {0} is declared outside of any project")]
    TargetWithoutProject(String),
    #[error("alias {alias} refers to unknown target {target}")]
    UnknownAliasTarget { alias: String, target: String },
}

pub type ModelResult<T> = Result<T, ModelError>;
