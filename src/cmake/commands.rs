//! Implemented script commands
//!
//! Each handler receives the already expanded arguments of one call. Handlers fail with a
//! [`ParseError`] only for conditions that must abort the script; optional values such as a
//! project's version or description are parsed softly and simply stay unset when absent.

use super::arguments::Argument;
use super::error::ModelError;
use super::message::{Message, MessageMode};
use super::parser::ScriptParser;
use super::project::Project;
use super::target::{Target, TargetAttributes, TargetKind};
use super::variables::VariableAttributes;
use crate::lexing::SourceLocation;
use crate::parsing::{ErrorKind, ParseError, ParseResult};
use std::path::{Component, Path, PathBuf};

/// Commands with an implementation; everything else is skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    CMakeMinimumRequired,
    Project,
    Message,
    Set,
    Unset,
    Option,
    AddExecutable,
    AddLibrary,
    AddSubdirectory,
}

impl Command {
    pub const ALL: [Command; 9] = [
        Command::CMakeMinimumRequired,
        Command::Project,
        Command::Message,
        Command::Set,
        Command::Unset,
        Command::Option,
        Command::AddExecutable,
        Command::AddLibrary,
        Command::AddSubdirectory,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Command::CMakeMinimumRequired => "cmake_minimum_required",
            Command::Project => "project",
            Command::Message => "message",
            Command::Set => "set",
            Command::Unset => "unset",
            Command::Option => "option",
            Command::AddExecutable => "add_executable",
            Command::AddLibrary => "add_library",
            Command::AddSubdirectory => "add_subdirectory",
        }
    }

    /// Case-insensitive lookup
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|command| command.name().eq_ignore_ascii_case(name))
    }
}

const PROJECT_KEYWORDS: [&str; 4] = ["VERSION", "DESCRIPTION", "HOMEPAGE_URL", "LANGUAGES"];

fn required<'x>(
    arguments: &'x [Argument],
    index: usize,
    what: &'static str,
    at: &SourceLocation,
) -> ParseResult<&'x Argument> {
    arguments.get(index).ok_or_else(|| {
        ParseError::new(
            ErrorKind::UnexpectedEnd {
                expected: vec![what],
            },
            at.clone(),
        )
    })
}

fn model_error(error: ModelError, at: &SourceLocation) -> ParseError {
    ParseError::semantic(error.to_string(), at.clone())
}

/// Variable name of an `ENV{NAME}` argument
fn environment_name(name: &str) -> Option<&str> {
    name.strip_prefix("ENV{")?.strip_suffix('}')
}

fn join_values(arguments: &[Argument]) -> String {
    arguments
        .iter()
        .map(Argument::value)
        .collect::<Vec<_>>()
        .join(";")
}

/// Value following an unquoted `keyword`, if one is there
fn keyword_value<'x>(arguments: &'x [Argument], keyword: &str) -> Option<&'x str> {
    let position = arguments.iter().position(|a| a.is_keyword(keyword))?;
    arguments.get(position + 1).map(Argument::value)
}

/// Lexically resolve `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

impl ScriptParser<'_> {
    pub(super) fn execute(
        &mut self,
        command: Command,
        arguments: &[Argument],
        at: &SourceLocation,
    ) -> ParseResult<()> {
        match command {
            Command::CMakeMinimumRequired => self.cmake_minimum_required(arguments),
            Command::Project => self.project(arguments, at),
            Command::Message => self.message(arguments, at),
            Command::Set => self.set(arguments, at),
            Command::Unset => self.unset(arguments, at),
            Command::Option => self.option(arguments, at),
            Command::AddExecutable => self.add_executable(arguments, at),
            Command::AddLibrary => self.add_library(arguments, at),
            Command::AddSubdirectory => self.add_subdirectory(arguments, at),
        }
    }

    fn cmake_minimum_required(&mut self, arguments: &[Argument]) -> ParseResult<()> {
        match keyword_value(arguments, "VERSION") {
            Some(range) => {
                let minimum = range.split("...").next().unwrap_or(range).to_string();
                self.model
                    .set_variable("CMAKE_MINIMUM_REQUIRED_VERSION", minimum);
            }
            None => tracing::debug!("cmake_minimum_required without a version"),
        }
        Ok(())
    }

    fn project(&mut self, arguments: &[Argument], at: &SourceLocation) -> ParseResult<()> {
        let name = required(arguments, 0, "project name", at)?.value();

        let mut version = None;
        let mut description = None;
        let mut homepage_url = None;
        let mut languages = Vec::new();
        let mut pending: Option<&str> = None;
        for argument in &arguments[1..] {
            if let Some(keyword) = PROJECT_KEYWORDS
                .into_iter()
                .find(|k| argument.is_keyword(k))
            {
                if let Some(missing) = pending.filter(|p| *p != "LANGUAGES") {
                    tracing::debug!(keyword = missing, "project keyword without a value");
                }
                pending = Some(keyword);
                continue;
            }
            let value = argument.value().to_string();
            match pending {
                Some("VERSION") => version = Some(value),
                Some("DESCRIPTION") => description = Some(value),
                Some("HOMEPAGE_URL") => homepage_url = Some(value),
                _ => languages.push(value),
            }
            if pending != Some("LANGUAGES") {
                pending = None;
            }
        }

        let parent = self
            .model
            .current_project()
            .or_else(|| self.model.projects().main());
        let directory = self.model.current_directory();
        let project = Project::new(name)
            .with_version(version.unwrap_or_default())
            .with_description(description.unwrap_or_default())
            .with_homepage_url(homepage_url.unwrap_or_default())
            .with_languages(languages)
            .with_directories(directory.source_dir(), directory.binary_dir())
            .with_parent(parent);
        self.model
            .add_project(project)
            .map_err(|e| model_error(e, at))?;
        Ok(())
    }

    fn message(&mut self, arguments: &[Argument], at: &SourceLocation) -> ParseResult<()> {
        let (mode, text) = match arguments.first() {
            Some(first) if !first.quoted() => match first.value().parse::<MessageMode>() {
                Ok(mode) => (mode, &arguments[1..]),
                Err(mode) if arguments.len() > 1 => {
                    return Err(ParseError::new(ErrorKind::InvalidMessageMode(mode), at.clone()));
                }
                Err(_) => (MessageMode::Notice, arguments),
            },
            _ => (MessageMode::Notice, arguments),
        };
        let text: String = text.iter().map(Argument::value).collect();

        self.model.record_message(Message {
            mode,
            text: text.clone(),
            location: at.clone(),
        });
        match mode {
            MessageMode::FatalError => Err(ParseError::new(ErrorKind::Script(text), at.clone())),
            MessageMode::SendError => {
                self.report(ParseError::new(ErrorKind::Script(text), at.clone()));
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn set(&mut self, arguments: &[Argument], at: &SourceLocation) -> ParseResult<()> {
        let name = required(arguments, 0, "variable name", at)?.value();
        let rest = &arguments[1..];

        if let Some(variable) = environment_name(name) {
            match rest.first() {
                Some(value) => self
                    .model
                    .set_environment_variable(variable, value.value()),
                None => self.model.unset_environment_variable(variable),
            }
            return Ok(());
        }

        if let Some(position) = rest.iter().position(|a| a.is_keyword("CACHE")) {
            let value = join_values(&rest[..position]);
            let type_tag = required(rest, position + 1, "cache entry type", at)?.value();
            let description = required(rest, position + 2, "cache entry docstring", at)?.value();
            let mut attributes = VariableAttributes::CACHE;
            if rest
                .get(position + 3)
                .is_some_and(|a| a.is_keyword("FORCE"))
            {
                attributes |= VariableAttributes::FORCE;
            }
            self.model
                .set_variable_with(name, &value, attributes, type_tag, description);
            return Ok(());
        }

        match rest.split_last() {
            Some((last, values)) if last.is_keyword("PARENT_SCOPE") => {
                if values.is_empty() {
                    self.model
                        .unset_variable_with(name, VariableAttributes::PARENT_SCOPE);
                } else {
                    self.model.set_variable_with(
                        name,
                        &join_values(values),
                        VariableAttributes::PARENT_SCOPE,
                        "",
                        "",
                    );
                }
            }
            Some(_) => self.model.set_variable(name, join_values(rest)),
            None => self.model.unset_variable(name),
        }
        Ok(())
    }

    fn unset(&mut self, arguments: &[Argument], at: &SourceLocation) -> ParseResult<()> {
        let name = required(arguments, 0, "variable name", at)?.value();
        if let Some(variable) = environment_name(name) {
            self.model.unset_environment_variable(variable);
            return Ok(());
        }

        let attributes = match arguments.get(1) {
            Some(a) if a.is_keyword("CACHE") => VariableAttributes::CACHE,
            Some(a) if a.is_keyword("PARENT_SCOPE") => VariableAttributes::PARENT_SCOPE,
            Some(other) => {
                return Err(ParseError::semantic(
                    format!("unset called with invalid option '{}'", other.value()),
                    at.clone(),
                ));
            }
            None => VariableAttributes::NONE,
        };
        self.model.unset_variable_with(name, attributes);
        Ok(())
    }

    fn option(&mut self, arguments: &[Argument], at: &SourceLocation) -> ParseResult<()> {
        let name = required(arguments, 0, "option name", at)?.value();
        let help = arguments.get(1).map(Argument::value).unwrap_or_default();
        let value = arguments.get(2).map(Argument::value).unwrap_or("OFF");

        if self.model.find_variable(name).is_some() {
            tracing::debug!(option = name, "option shadowed by a normal variable");
            return Ok(());
        }
        self.model
            .set_variable_with(name, value, VariableAttributes::CACHE, "BOOL", help);
        let cached = self.model.get_cache_variable(name).to_string();
        self.model.set_variable(name, cached);
        Ok(())
    }

    fn add_executable(&mut self, arguments: &[Argument], at: &SourceLocation) -> ParseResult<()> {
        let name = required(arguments, 0, "target name", at)?.value();
        let rest = &arguments[1..];
        let target = match rest.first() {
            Some(a) if a.is_keyword("ALIAS") => {
                Target::alias(name, required(rest, 1, "aliased target", at)?.value())
            }
            _ => {
                let (attributes, sources) = target_options(
                    rest,
                    TargetAttributes::WIN32_EXE
                        | TargetAttributes::MACOSX_BUNDLE
                        | TargetAttributes::EXCLUDE_FROM_ALL
                        | TargetAttributes::IMPORTED
                        | TargetAttributes::GLOBAL,
                );
                Target::new(name, TargetKind::Executable)
                    .with_attributes(attributes)
                    .with_sources(sources)
            }
        };
        self.model.add_target(target).map_err(|e| model_error(e, at))
    }

    fn add_library(&mut self, arguments: &[Argument], at: &SourceLocation) -> ParseResult<()> {
        let name = required(arguments, 0, "target name", at)?.value();
        let mut rest = &arguments[1..];

        let mut kind = TargetKind::StaticLibrary;
        if let Some(first) = rest.first().filter(|a| !a.quoted()) {
            let declared = match first.value() {
                "ALIAS" => {
                    let aliased = required(rest, 1, "aliased target", at)?.value();
                    return self
                        .model
                        .add_target(Target::alias(name, aliased))
                        .map_err(|e| model_error(e, at));
                }
                "INTERFACE" | "UNKNOWN" => {
                    tracing::debug!(target = name, kind = first.value(), "library kind not modelled");
                    return Ok(());
                }
                "STATIC" => Some(TargetKind::StaticLibrary),
                "SHARED" | "MODULE" => Some(TargetKind::SharedLibrary),
                "OBJECT" => Some(TargetKind::ObjectLibrary),
                _ => None,
            };
            if let Some(declared) = declared {
                kind = declared;
                rest = &rest[1..];
            }
        }

        let (attributes, sources) = target_options(
            rest,
            TargetAttributes::EXCLUDE_FROM_ALL | TargetAttributes::IMPORTED | TargetAttributes::GLOBAL,
        );
        let target = Target::new(name, kind)
            .with_attributes(attributes)
            .with_sources(sources);
        self.model.add_target(target).map_err(|e| model_error(e, at))
    }

    fn add_subdirectory(&mut self, arguments: &[Argument], at: &SourceLocation) -> ParseResult<()> {
        let source = required(arguments, 0, "source directory", at)?.value();
        let binary = arguments
            .get(1)
            .filter(|a| !a.is_keyword("EXCLUDE_FROM_ALL") && !a.is_keyword("SYSTEM"))
            .map(Argument::value);

        let current = self.model.current_directory();
        let source_dir = normalize(&current.source_dir().join(source));
        if !source_dir.is_dir() {
            return Err(ParseError::new(
                ErrorKind::MissingPath(source_dir.display().to_string()),
                at.clone(),
            ));
        }
        let binary_dir = match binary {
            Some(binary) => normalize(&current.binary_dir().join(binary)),
            None if Path::new(source).is_absolute() => {
                let leaf = source_dir.file_name().map(PathBuf::from).unwrap_or_default();
                normalize(&current.binary_dir().join(leaf))
            }
            None => normalize(&current.binary_dir().join(source)),
        };

        let limit = self.settings.max_directory_depth;
        if self.model.directory_depth() >= limit {
            return Err(ParseError::new(ErrorKind::RecursionLimit(limit), at.clone()));
        }

        self.model
            .enter_directory(source_dir.clone(), binary_dir)
            .map_err(|e| model_error(e, at))?;
        let script = source_dir.join(&self.settings.script_file_name);
        let mut child = ScriptParser::new(&mut *self.model, self.settings);
        let completed = child.parse_file(&script);
        let errors = child.into_errors();
        self.model.leave_directory();

        self.errors.extend(errors);
        if completed {
            Ok(())
        } else {
            Err(ParseError::new(
                ErrorKind::Script(format!(
                    "processing of subdirectory {} failed",
                    source_dir.display()
                )),
                at.clone(),
            ))
        }
    }
}

/// Split target arguments into the allowed flags and the source list
fn target_options(arguments: &[Argument], allowed: TargetAttributes) -> (TargetAttributes, Vec<String>) {
    let mut attributes = TargetAttributes::NONE;
    let mut sources = Vec::new();
    for argument in arguments {
        let flag = (!argument.quoted())
            .then(|| TargetAttributes::from_keyword(argument.value()))
            .flatten()
            .filter(|flag| allowed.contains(*flag));
        match flag {
            Some(flag) => attributes |= flag,
            None => sources.push(argument.value().to_string()),
        }
    }
    (attributes, sources)
}
