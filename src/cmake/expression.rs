//! Variable reference expansion
//!
//! `${NAME}` resolves through the current scope and then the cache, `$ENV{NAME}` through
//! the environment and `$CACHE{NAME}` through the cache alone; unknown names expand to
//! nothing. A reference name cannot itself contain `$`, `{` or `}`, so each pass replaces
//! the innermost references first and a nested reference such as `${A_${B}}` resolves over
//! two passes. Passes repeat until the text stops changing, bounded by a pass limit so a
//! self-referencing value cannot loop forever.
//!
//! Text that does not form a complete reference (`${X` without a closing brace, a lone
//! `$`) is kept verbatim.

use super::model::CMakeModel;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(ENV|CACHE)?\{([^${}]*)\}").unwrap());

/// Expands references in script text against a model
#[derive(Clone, Copy)]
pub struct ExpressionEvaluator<'m> {
    model: &'m CMakeModel,
    max_passes: usize,
}

impl<'m> ExpressionEvaluator<'m> {
    pub fn new(model: &'m CMakeModel, max_passes: usize) -> Self {
        Self { model, max_passes }
    }

    /// `text` with every reference expanded to a fixed point
    pub fn evaluate(&self, text: &str) -> String {
        let mut current = text.to_string();
        for _ in 0..self.max_passes {
            let next = match self.expand_once(&current) {
                Cow::Borrowed(_) => return current,
                Cow::Owned(next) => next,
            };
            if next == current {
                return current;
            }
            current = next;
        }
        if REFERENCE.is_match(&current) {
            tracing::warn!(
                text,
                passes = self.max_passes,
                "reference expansion did not settle"
            );
        }
        current
    }

    fn expand_once<'t>(&self, text: &'t str) -> Cow<'t, str> {
        REFERENCE.replace_all(text, |captures: &Captures| {
            let name = &captures[2];
            let value = match captures.get(1).map(|m| m.as_str()) {
                Some("ENV") => self.model.get_environment_variable(name),
                Some(_) => self.model.get_cache_variable(name),
                None => self.model.resolve_variable(name),
            };
            value.to_string()
        })
    }
}

/// Convenience for a one-off expansion
pub fn evaluate(model: &CMakeModel, text: &str, max_passes: usize) -> String {
    ExpressionEvaluator::new(model, max_passes).evaluate(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmake::variables::VariableAttributes;
    use crate::config::ModelSettings;
    use rstest::rstest;

    fn model() -> CMakeModel {
        let settings = ModelSettings {
            import_environment: false,
            ..ModelSettings::default()
        };
        let mut model = CMakeModel::new("/src", "/build", &settings);
        model.set_variable("A", "alpha");
        model.set_variable("B", "x");
        model.set_variable("A_x", "nested");
        model.set_variable("INDIRECT", "${A}");
        model.set_variable("SELF", "${SELF}!");
        model.set_variable_with("C", "cached", VariableAttributes::CACHE, "STRING", "");
        model.set_environment_variable("HOME", "/home/me");
        model
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case("${A}", "alpha")]
    #[case("<${A}|${A}>", "<alpha|alpha>")]
    #[case("${MISSING}", "")]
    #[case("${C}", "cached")]
    #[case("$CACHE{C}", "cached")]
    #[case("$CACHE{A}", "")]
    #[case("$ENV{HOME}/bin", "/home/me/bin")]
    #[case("${A_${B}}", "nested")]
    #[case("${INDIRECT}", "alpha")]
    #[case("${A", "${A")]
    #[case("$ {A}", "$ {A}")]
    #[case("cost: $5", "cost: $5")]
    #[case("${A}${", "alpha${")]
    fn test_evaluate(#[case] text: &str, #[case] expected: &str) {
        let model = model();
        assert_eq!(evaluate(&model, text, 32), expected);
    }

    #[test]
    fn test_scope_shadows_cache() {
        let mut model = model();
        model.set_variable("C", "scoped");
        assert_eq!(evaluate(&model, "${C}", 32), "scoped");
        assert_eq!(evaluate(&model, "$CACHE{C}", 32), "cached");
    }

    #[test]
    fn test_pass_limit_stops_self_reference() {
        let model = model();
        assert_eq!(evaluate(&model, "${SELF}", 3), "${SELF}!!!");
        assert_eq!(evaluate(&model, "${A}", 0), "${A}");
    }
}
