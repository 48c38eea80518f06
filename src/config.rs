//! Configuration loading
//!
//! `defaults/cmake-parser.default.toml` is embedded into the crate so that documented
//! defaults and runtime behavior stay in sync. Callers layer user files and single-key
//! overrides on top through [`Loader`] before deserializing into [`Settings`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

pub use config::ConfigError;

const DEFAULT_TOML: &str = include_str!("../defaults/cmake-parser.default.toml");

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub parser: ParserSettings,
    pub model: ModelSettings,
    pub logging: LoggingSettings,
}

/// Script interpreter knobs
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParserSettings {
    pub script_file_name: String,
    pub max_directory_depth: usize,
    pub max_expansion_passes: usize,
}

/// Values the model is seeded with
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelSettings {
    pub generator: String,
    pub make_program: String,
    pub build_type: String,
    pub import_environment: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    pub filter: String,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            script_file_name: "CMakeLists.txt".to_string(),
            max_directory_depth: 64,
            max_expansion_passes: 32,
        }
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            generator: "Unix Makefiles".to_string(),
            make_program: "make".to_string(),
            build_type: String::new(),
            import_environment: true,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            parser: ParserSettings::default(),
            model: ModelSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Builds [`Settings`] from `defaults/cmake-parser.default.toml` with later sources winning
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Only the compiled-in `cmake-parser.default.toml` so far
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Add a TOML file named on the command line; `build` fails if it does not exist
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Add a TOML file that may be missing, like the `cmake-parser.toml` the CLI looks
    /// for in the working directory
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Force one dotted key, e.g. `parser.max_directory_depth`, over every file source
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Merge the sources and deserialize them into [`Settings`]
    pub fn build(self) -> Result<Settings, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings from the compiled-in defaults alone
pub fn load_defaults() -> Result<Settings, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn embedded_defaults_match_default_impl() {
        let settings = load_defaults().expect("defaults to deserialize");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.parser.script_file_name, "CMakeLists.txt");
    }

    #[test]
    fn supports_overrides() {
        let settings = Loader::new()
            .set_override("parser.max_directory_depth", 3)
            .expect("override to apply")
            .set_override("model.generator", "Ninja")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(settings.parser.max_directory_depth, 3);
        assert_eq!(settings.model.generator, "Ninja");
    }

    #[test]
    fn layers_user_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[logging]\nfilter = \"debug\"").unwrap();
        let settings = Loader::new().with_file(file.path()).build().unwrap();
        assert_eq!(settings.logging.filter, "debug");
        assert_eq!(settings.model.make_program, "make");
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let settings = Loader::new()
            .with_optional_file("/nonexistent/cmake-parser.toml")
            .build()
            .unwrap();
        assert_eq!(settings, Settings::default());
    }
}
