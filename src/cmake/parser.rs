//! Build-script interpreter
//!
//! [`ScriptParser`] is the [`ParserCallback`] that turns a script's token stream into
//! model mutations. Each top-level token must start a command: an identifier followed by a
//! parenthesised argument list. Implemented commands are dispatched by
//! [`Command`](super::commands::Command); anything else has its argument list skipped with
//! balanced parentheses and is not an error.
//!
//! Errors
//!
//!     A failing command aborts the current script and is counted. `message(SEND_ERROR)` is
//!     counted without aborting. `add_subdirectory` runs a nested parser over the child
//!     script; the child's errors are added to the parent's, and a failed child fails the
//!     `add_subdirectory` call. A script parse succeeds only when every token was consumed
//!     and no error was counted.
//!
//! [`CMakeParser`] is the entry point for a whole source tree.

use super::arguments::{Argument, ArgumentCollector};
use super::commands::Command;
use super::expression::ExpressionEvaluator;
use super::model::CMakeModel;
use super::tokens::{catalog, CMakeToken, SKIPPED};
use crate::config::{ParserSettings, Settings};
use crate::lexing::{Reader, SourceLocation, Token, Tokenizer};
use crate::parsing::{ErrorKind, Flow, ParseError, ParseResult, ParserCallback, ParserExecutor};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Interpreter for one script file, writing into a shared model
pub struct ScriptParser<'a> {
    pub(super) model: &'a mut CMakeModel,
    pub(super) settings: &'a ParserSettings,
    pub(super) executor: ParserExecutor<CMakeToken>,
    pub(super) errors: Vec<ParseError>,
}

impl<'a> ScriptParser<'a> {
    pub fn new(model: &'a mut CMakeModel, settings: &'a ParserSettings) -> Self {
        Self {
            model,
            settings,
            executor: ParserExecutor::new(SKIPPED),
            errors: Vec::new(),
        }
    }

    /// Interpret every command in `tokenizer`
    pub fn parse(&mut self, tokenizer: &mut Tokenizer<'_, CMakeToken>) -> bool {
        let executor = self.executor.clone();
        let completed = executor.parse(tokenizer, self);
        if let Some(error) = tokenizer.take_read_error() {
            let location = tokenizer.location().clone();
            self.report(ParseError::new(
                ErrorKind::Io {
                    path: location.file().to_string(),
                    message: error.to_string(),
                },
                location,
            ));
        }
        completed && self.errors.is_empty()
    }

    /// Interpret in-memory script text attributed to `file`
    pub fn parse_str(&mut self, file: &str, source: &str) -> bool {
        let mut tokenizer = Tokenizer::from_string(catalog(), file, source);
        self.parse(&mut tokenizer)
    }

    /// Interpret the script at `path`, which becomes `CMAKE_CURRENT_LIST_FILE`
    pub fn parse_file(&mut self, path: &Path) -> bool {
        let name = path.display().to_string();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(error) => {
                self.report(ParseError::new(
                    ErrorKind::Io {
                        path: name.clone(),
                        message: error.to_string(),
                    },
                    SourceLocation::new(&name),
                ));
                return false;
            }
        };

        self.model
            .set_variable("CMAKE_CURRENT_LIST_FILE", name.as_str());
        if let Some(dir) = path.parent() {
            self.model
                .set_variable("CMAKE_CURRENT_LIST_DIR", dir.display().to_string());
        }
        tracing::debug!(file = %name, "parsing script");

        let reader = Reader::new(&name, Box::new(BufReader::new(file)));
        let mut tokenizer = Tokenizer::new(catalog(), reader);
        self.parse(&mut tokenizer)
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    pub fn model(&self) -> &CMakeModel {
        &*self.model
    }

    pub(super) fn report(&mut self, error: ParseError) {
        tracing::error!(at = %error.location, "{}", error.kind);
        self.errors.push(error);
    }

    pub(super) fn evaluator(&self) -> ExpressionEvaluator<'_> {
        ExpressionEvaluator::new(&*self.model, self.settings.max_expansion_passes)
    }

    /// Expand raw argument tokens against the current model state, splitting unquoted lists
    pub(super) fn evaluate(&self, tokens: &[Token<CMakeToken>]) -> Vec<Argument> {
        let evaluator = self.evaluator();
        tokens
            .iter()
            .flat_map(|token| Argument::expand(token, &evaluator))
            .collect()
    }
}

impl ParserCallback<CMakeToken> for ScriptParser<'_> {
    fn on_token(
        &mut self,
        token: Token<CMakeToken>,
        tokenizer: &mut Tokenizer<'_, CMakeToken>,
    ) -> ParseResult<Flow<CMakeToken>> {
        if !token.is(CMakeToken::Identifier) {
            return Err(ParseError::unexpected(
                tokenizer.catalog(),
                &token,
                &[CMakeToken::Identifier],
            ));
        }
        self.executor.expect(tokenizer, &[CMakeToken::LeftParen])?;
        let tokens = ArgumentCollector::new().collect(&self.executor, tokenizer)?;

        match Command::from_name(token.text()) {
            Some(command) => {
                tracing::debug!(command = command.name(), at = %token.begin(), "command");
                let arguments = self.evaluate(&tokens);
                self.execute(command, &arguments, token.begin())?;
            }
            None => {
                tracing::debug!(command = token.text(), at = %token.begin(), "skipping command");
            }
        }
        Ok(Flow::Continue)
    }

    fn on_parse_error(&mut self, error: ParseError) {
        self.report(error);
    }
}

/// Result of interpreting a source tree
#[derive(Debug)]
pub struct ParseOutcome {
    pub model: CMakeModel,
    pub errors: Vec<ParseError>,
    pub success: bool,
}

/// Interprets a source tree starting at its top-level script
#[derive(Debug, Clone, Default)]
pub struct CMakeParser {
    settings: Settings,
}

impl CMakeParser {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Interpret `<source_dir>/<script file>` into a fresh model
    pub fn parse(&self, source_dir: impl Into<PathBuf>, binary_dir: impl Into<PathBuf>) -> ParseOutcome {
        let source_dir = source_dir.into();
        let mut model = CMakeModel::new(source_dir.clone(), binary_dir, &self.settings.model);
        let script = source_dir.join(&self.settings.parser.script_file_name);

        let mut parser = ScriptParser::new(&mut model, &self.settings.parser);
        let success = parser.parse_file(&script);
        let errors = parser.into_errors();
        tracing::info!(
            script = %script.display(),
            success,
            errors = errors.len(),
            "source tree parsed"
        );
        ParseOutcome {
            model,
            errors,
            success,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmake::message::MessageMode;
    use crate::config::ModelSettings;

    fn run(source: &str) -> (CMakeModel, bool, Vec<ParseError>) {
        let settings = ModelSettings {
            import_environment: false,
            ..ModelSettings::default()
        };
        let parser_settings = ParserSettings::default();
        let mut model = CMakeModel::new("/src", "/build", &settings);
        let mut parser = ScriptParser::new(&mut model, &parser_settings);
        let ok = parser.parse_str("CMakeLists.txt", source);
        let errors = parser.into_errors();
        (model, ok, errors)
    }

    #[test]
    fn test_unknown_commands_are_skipped() {
        let (model, ok, errors) = run(
            "target_link_libraries(app PRIVATE (nested (deep)) x)\n\
             set(AFTER yes)\n",
        );
        assert!(ok, "{errors:?}");
        assert_eq!(model.get_variable("AFTER"), "yes");
    }

    #[test]
    fn test_commands_are_case_insensitive() {
        let (model, ok, _) = run("SET(A 1)\nSet(B 2)\n");
        assert!(ok);
        assert_eq!(model.get_variable("A"), "1");
        assert_eq!(model.get_variable("B"), "2");
    }

    #[test]
    fn test_stray_argument_is_an_error() {
        let (_, ok, errors) = run("set(A 1)\n\"oops\"\nset(B 2)\n");
        assert!(!ok);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].location.line(), 2);
    }

    #[test]
    fn test_missing_parenthesis() {
        let (_, ok, errors) = run("project Foo\n");
        assert!(!ok);
        assert!(matches!(errors[0].kind, ErrorKind::UnexpectedToken { .. }));

        let (_, ok, errors) = run("set(A 1");
        assert!(!ok);
        assert!(matches!(errors[0].kind, ErrorKind::UnexpectedEnd { .. }));
    }

    #[test]
    fn test_error_aborts_remaining_script() {
        let (model, ok, errors) = run("message(FATAL_ERROR \"stop\")\nset(NEVER 1)\n");
        assert!(!ok);
        assert_eq!(errors.len(), 1);
        assert!(model.find_variable("NEVER").is_none());
        assert_eq!(model.messages()[0].mode, MessageMode::FatalError);
    }

    #[test]
    fn test_send_error_continues() {
        let (model, ok, errors) = run("message(SEND_ERROR \"bad\")\nset(LATER 1)\n");
        assert!(!ok);
        assert_eq!(errors.len(), 1);
        assert_eq!(model.get_variable("LATER"), "1");
    }

    #[test]
    fn test_arguments_see_earlier_commands() {
        let (model, ok, _) = run("set(A x)\nset(B \"${A}-${A}\")\n");
        assert!(ok);
        assert_eq!(model.get_variable("B"), "x-x");
    }

    #[test]
    fn test_missing_script_file() {
        let settings = ParserSettings::default();
        let mut model = CMakeModel::with_defaults("/src", "/build");
        let mut parser = ScriptParser::new(&mut model, &settings);
        assert!(!parser.parse_file(Path::new("/nonexistent/CMakeLists.txt")));
        assert!(matches!(parser.errors()[0].kind, ErrorKind::Io { .. }));
    }
}
