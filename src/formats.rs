//! Model serialization
//!
//! Every model entity can be written as a human-readable text dump or as JSON through
//! [`serialize`]. JSON output is indented by four spaces per level, maps keep the order of
//! the underlying ordered collections and empty collections render as `[]` or `{}` on one
//! line. The `indent` argument shifts the whole output right by that many levels so it can
//! be embedded in a larger document.
//!
//! Whole-model output for the command line goes through a [`FormatRegistry`] of named
//! [`ModelFormatter`]s.

use crate::cmake::{
    CMakeModel, Directory, Message, Project, Target, TypedVariable, TypedVariableList,
    Variable, VariableList,
};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::str::FromStr;

const INDENT: &str = "    ";

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("format '{0}' not found")]
    FormatNotFound(String),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output flavor of [`serialize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(FormatError::FormatNotFound(s.to_string())),
        }
    }
}

/// Indentation-aware line sink for text dumps
#[derive(Debug, Default)]
pub struct TextWriter {
    out: String,
    level: usize,
}

impl TextWriter {
    pub fn new(level: usize) -> Self {
        Self {
            out: String::new(),
            level,
        }
    }

    pub fn line(&mut self, args: fmt::Arguments<'_>) {
        for _ in 0..self.level {
            self.out.push_str(INDENT);
        }
        // Writing into a String cannot fail
        let _ = self.out.write_fmt(args);
        self.out.push('\n');
    }

    /// Run `body` one level deeper
    pub fn nested(&mut self, body: impl FnOnce(&mut Self)) {
        self.level += 1;
        body(self);
        self.level -= 1;
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// An entity with both a text and a JSON rendering
pub trait Entity: Serialize {
    fn write_text(&self, writer: &mut TextWriter);
}

/// Render `entity` in `format`, shifted right by `indent` levels
pub fn serialize<E: Entity + ?Sized>(
    entity: &E,
    format: OutputFormat,
    indent: usize,
) -> Result<String, FormatError> {
    match format {
        OutputFormat::Text => {
            let mut writer = TextWriter::new(indent);
            entity.write_text(&mut writer);
            Ok(writer.finish())
        }
        OutputFormat::Json => to_json(entity, indent),
    }
}

/// Four-space indented JSON; lines after the first are shifted by `indent` levels
pub fn to_json<T: Serialize + ?Sized>(value: &T, indent: usize) -> Result<String, FormatError> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    let json = String::from_utf8_lossy(&buffer).into_owned();
    if indent == 0 {
        return Ok(json);
    }
    let shift = format!("\n{}", INDENT.repeat(indent));
    Ok(json.replace('\n', &shift))
}

impl Entity for Variable {
    fn write_text(&self, writer: &mut TextWriter) {
        writer.line(format_args!("{} = {}", self.name(), self.value()));
    }
}

impl Entity for VariableList {
    fn write_text(&self, writer: &mut TextWriter) {
        for variable in self.iter() {
            variable.write_text(writer);
        }
    }
}

impl Entity for TypedVariable {
    fn write_text(&self, writer: &mut TextWriter) {
        if !self.description().is_empty() {
            writer.line(format_args!("// {}", self.description()));
        }
        writer.line(format_args!(
            "{}:{}={}",
            self.name(),
            self.type_tag(),
            self.value()
        ));
    }
}

impl Entity for TypedVariableList {
    fn write_text(&self, writer: &mut TextWriter) {
        for variable in self.iter() {
            variable.write_text(writer);
        }
    }
}

impl Entity for Target {
    fn write_text(&self, writer: &mut TextWriter) {
        let mut header = format!("{} ({})", self.name(), self.kind());
        let flags = self.attributes().names();
        if !flags.is_empty() {
            let _ = write!(header, " [{}]", flags.join(", "));
        }
        if let Some(aliased) = self.alias_target() {
            let _ = write!(header, " -> {aliased}");
        }
        writer.line(format_args!("{header}"));
        writer.nested(|w| {
            for source in self.sources() {
                w.line(format_args!("{source}"));
            }
        });
    }
}

impl Entity for Project {
    fn write_text(&self, writer: &mut TextWriter) {
        if self.version().is_empty() {
            writer.line(format_args!("project {}", self.name()));
        } else {
            writer.line(format_args!("project {} {}", self.name(), self.version()));
        }
        writer.nested(|w| {
            if !self.description().is_empty() {
                w.line(format_args!("description: {}", self.description()));
            }
            if !self.homepage_url().is_empty() {
                w.line(format_args!("homepage: {}", self.homepage_url()));
            }
            if !self.languages().is_empty() {
                w.line(format_args!("languages: {}", self.languages().join(" ")));
            }
            w.line(format_args!("source: {}", self.source_dir().display()));
            w.line(format_args!("binary: {}", self.binary_dir().display()));
            for target in self.targets().iter() {
                target.write_text(w);
            }
        });
    }
}

impl Entity for Directory {
    fn write_text(&self, writer: &mut TextWriter) {
        writer.line(format_args!("directory {}", self.source_dir().display()));
        writer.nested(|w| {
            w.line(format_args!("binary: {}", self.binary_dir().display()));
            w.line(format_args!("variables:"));
            w.nested(|w| self.variables().write_text(w));
        });
    }
}

impl Entity for Message {
    fn write_text(&self, writer: &mut TextWriter) {
        writer.line(format_args!("[{}] {}: {}", self.mode, self.location, self.text));
    }
}

impl Entity for CMakeModel {
    fn write_text(&self, writer: &mut TextWriter) {
        let root = self.root_directory();
        writer.line(format_args!("source: {}", root.source_dir().display()));
        writer.line(format_args!("binary: {}", root.binary_dir().display()));

        writer.line(format_args!("projects:"));
        writer.nested(|w| {
            for (_, project) in self.projects().iter() {
                project.write_text(w);
            }
        });
        writer.line(format_args!("directories:"));
        writer.nested(|w| {
            for (_, directory) in self.directories().iter() {
                directory.write_text(w);
            }
        });
        writer.line(format_args!("cache:"));
        writer.nested(|w| self.cache().write_text(w));
        if !self.messages().is_empty() {
            writer.line(format_args!("messages:"));
            writer.nested(|w| {
                for message in self.messages() {
                    message.write_text(w);
                }
            });
        }
    }
}

/// Whole-model output by name
pub trait ModelFormatter: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn format(&self, model: &CMakeModel) -> Result<String, FormatError>;
}

pub struct TextFormatter;

impl ModelFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Indented human-readable dump"
    }

    fn format(&self, model: &CMakeModel) -> Result<String, FormatError> {
        serialize(model, OutputFormat::Text, 0)
    }
}

pub struct JsonFormatter;

impl ModelFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "JSON document with four-space indentation"
    }

    fn format(&self, model: &CMakeModel) -> Result<String, FormatError> {
        serialize(model, OutputFormat::Json, 0)
    }
}

/// Registry of model formatters
pub struct FormatRegistry {
    formatters: HashMap<String, Box<dyn ModelFormatter>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self {
            formatters: HashMap::new(),
        }
    }

    /// Register `formatter`, replacing one with the same name
    pub fn register<F: ModelFormatter + 'static>(&mut self, formatter: F) {
        self.formatters
            .insert(formatter.name().to_string(), Box::new(formatter));
    }

    pub fn get(&self, name: &str) -> Result<&dyn ModelFormatter, FormatError> {
        self.formatters
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| FormatError::FormatNotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    /// Registered names, sorted
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formatters.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn format(&self, model: &CMakeModel, name: &str) -> Result<String, FormatError> {
        self.get(name)?.format(model)
    }

    /// Registry holding the text and JSON formatters
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(TextFormatter);
        registry.register(JsonFormatter);
        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
