//! Command argument lists
//!
//! Everything between a command's `(` and its matching `)` is gathered by an
//! [`ArgumentCollector`] running under the same [`ParserExecutor`] loop as the script
//! itself. Nested parentheses are balanced and kept as literal arguments; the closing
//! parenthesis stops the loop and is consumed afterwards. Collected tokens become
//! [`Argument`]s once the interpreter expands them against the model.

use super::expression::ExpressionEvaluator;
use super::tokens::CMakeToken;
use crate::lexing::{SourceLocation, Token, Tokenizer};
use crate::parsing::{ErrorKind, Flow, ParseError, ParseResult, ParserCallback, ParserExecutor};

/// An expanded command argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    value: String,
    quoted: bool,
    location: SourceLocation,
}

impl Argument {
    pub fn new(value: impl Into<String>, quoted: bool, location: SourceLocation) -> Self {
        Self {
            value: value.into(),
            quoted,
            location,
        }
    }

    /// Expand `token` into a single argument
    ///
    /// Quoted text is unquoted and unescaped before variable references are expanded;
    /// unquoted text is unescaped except for `\;`. An escaped `\$` never opens a
    /// reference: the text around it is expanded piecewise and rejoined with a literal `$`.
    pub fn evaluate(token: &Token<CMakeToken>, evaluator: &ExpressionEvaluator<'_>) -> Self {
        let quoted = token.is(CMakeToken::QuotedArgument);
        let raw = if quoted {
            unquote(token.text())
        } else {
            token.text()
        };
        let value = split_escaped_dollars(raw)
            .into_iter()
            .map(|part| evaluator.evaluate(&unescape_with(part, !quoted)))
            .collect::<Vec<_>>()
            .join("$");
        Self::new(value, quoted, token.begin().clone())
    }

    /// Expand `token` into the arguments a command sees
    ///
    /// A quoted token is always one argument. An unquoted token is a list: its expanded
    /// value is split at every `;` not escaped by a backslash and empty elements are
    /// dropped, so a reference to an unset variable contributes no argument at all.
    pub fn expand(token: &Token<CMakeToken>, evaluator: &ExpressionEvaluator<'_>) -> Vec<Self> {
        let argument = Self::evaluate(token, evaluator);
        if argument.quoted {
            return vec![argument];
        }
        split_list(&argument.value)
            .into_iter()
            .map(|element| Self::new(element, false, argument.location.clone()))
            .collect()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn quoted(&self) -> bool {
        self.quoted
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// Unquoted argument spelling `keyword` exactly
    pub fn is_keyword(&self, keyword: &str) -> bool {
        !self.quoted && self.value == keyword
    }
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}

/// Resolve backslash escapes: `\n`, `\t` and `\r` become control characters, any other
/// escaped character stands for itself; a trailing lone backslash is kept
pub fn unescape(text: &str) -> String {
    unescape_with(text, false)
}

fn unescape_with(text: &str, keep_semicolon: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(';') if keep_semicolon => out.push_str("\\;"),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Pieces of raw `text` between escaped dollar signs; other escape pairs stay intact
fn split_escaped_dollars(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices();
    while let Some((index, ch)) = chars.next() {
        if ch != '\\' {
            continue;
        }
        if let Some((_, '$')) = chars.next() {
            parts.push(&text[start..index]);
            start = index + 2;
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Non-empty elements of a list value; `\;` does not separate elements
fn split_list(value: &str) -> Vec<String> {
    let mut elements = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for ch in value.chars() {
        if ch == ';' && !escaped {
            if !current.is_empty() {
                elements.push(std::mem::take(&mut current));
            }
        } else {
            current.push(ch);
        }
        escaped = ch == '\\' && !escaped;
    }
    if !current.is_empty() {
        elements.push(current);
    }
    elements
}

/// Gathers argument tokens up to the closing parenthesis
#[derive(Debug, Default)]
pub struct ArgumentCollector {
    depth: usize,
    tokens: Vec<Token<CMakeToken>>,
    error: Option<ParseError>,
    end: Option<SourceLocation>,
}

impl ArgumentCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the arguments following an already consumed `(`, and consume the `)`
    pub fn collect(
        mut self,
        executor: &ParserExecutor<CMakeToken>,
        tokenizer: &mut Tokenizer<'_, CMakeToken>,
    ) -> ParseResult<Vec<Token<CMakeToken>>> {
        if executor.parse(tokenizer, &mut self) {
            executor.expect(tokenizer, &[CMakeToken::RightParen])?;
            return Ok(self.tokens);
        }
        Err(match (self.error, self.end) {
            (Some(error), _) => error,
            (None, end) => ParseError::new(
                ErrorKind::UnexpectedEnd {
                    expected: vec![tokenizer.catalog().name_of(CMakeToken::RightParen)],
                },
                end.unwrap_or_else(|| tokenizer.location().clone()),
            ),
        })
    }
}

impl ParserCallback<CMakeToken> for ArgumentCollector {
    fn on_token(
        &mut self,
        token: Token<CMakeToken>,
        _tokenizer: &mut Tokenizer<'_, CMakeToken>,
    ) -> ParseResult<Flow<CMakeToken>> {
        match token.kind() {
            CMakeToken::RightParen if self.depth == 0 => return Ok(Flow::Stop(token)),
            CMakeToken::RightParen => self.depth -= 1,
            CMakeToken::LeftParen => self.depth += 1,
            _ => {}
        }
        self.tokens.push(token);
        Ok(Flow::Continue)
    }

    fn on_no_more_token(&mut self, location: &SourceLocation) -> bool {
        self.end = Some(location.clone());
        false
    }

    fn on_parse_error(&mut self, error: ParseError) {
        self.error = Some(error);
    }
}
