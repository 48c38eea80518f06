//! CMake build-script interpreter
//!
//! A recursive-descent interpreter for a functional subset of the CMake language, built
//! on the generic [`lexing`](crate::lexing) and [`parsing`](crate::parsing) layers. Running
//! a script fills a [`CMakeModel`] with what the real tool would know after configuring:
//! scoped variables per directory, the cache, the environment, projects and their targets.
//!
//! Implemented commands: `cmake_minimum_required`, `project`, `message`, `set`, `unset`,
//! `option`, `add_executable`, `add_library` and `add_subdirectory`. Every other command
//! is skipped.
//!
//! ```text
//! let outcome = CMakeParser::new(settings).parse("path/to/source", "path/to/build");
//! outcome.model.get_variable("PROJECT_NAME");
//! ```

pub mod arguments;
pub mod commands;
pub mod directory;
pub mod error;
pub mod expression;
pub mod message;
pub mod model;
pub mod parser;
pub mod project;
pub mod target;
pub mod tokens;
pub mod variables;

pub use directory::{Directory, DirectoryId, DirectoryList, DirectoryStack};
pub use error::{ModelError, ModelResult};
pub use expression::ExpressionEvaluator;
pub use message::{Message, MessageMode};
pub use model::CMakeModel;
pub use parser::{CMakeParser, ParseOutcome, ScriptParser};
pub use project::{Project, ProjectId, ProjectList};
pub use target::{Target, TargetAttributes, TargetKind, TargetList};
pub use tokens::CMakeToken;
pub use variables::{TypedVariable, TypedVariableList, Variable, VariableAttributes, VariableList};
