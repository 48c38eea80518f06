//! Parse errors
//!
//! Every failure a parser can report carries the location it was detected at and an
//! [`ErrorKind`]. Errors abort the parse level they are raised in; conditions that a
//! parser treats as "value absent" are expressed with `Option` instead and never become a
//! `ParseError`.

use crate::lexing::{SourceLocation, Token, TokenKind, TokenCatalog};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    /// No token rule matched the scanned text
    #[error("invalid token '{text}'")]
    Lexical { text: String },
    /// A token that is not allowed here
    #[error("unexpected {found} '{text}'{}", expectation(.expected))]
    UnexpectedToken {
        found: &'static str,
        text: String,
        expected: Vec<&'static str>,
    },
    /// Input ended while more was required
    #[error("unexpected end of input{}", expectation(.expected))]
    UnexpectedEnd { expected: Vec<&'static str> },
    #[error("invalid message mode '{0}'")]
    InvalidMessageMode(String),
    #[error("path does not exist: {0}")]
    MissingPath(String),
    #[error("nesting exceeds {0} levels")]
    RecursionLimit(usize),
    /// A well-formed command whose effect is not allowed
    #[error("{0}")]
    Semantic(String),
    #[error("cannot read {path}: {message}")]
    Io { path: String, message: String },
    /// Failure reported by the script itself
    #[error("{0}")]
    Script(String),
}

fn expectation(expected: &[&'static str]) -> String {
    if expected.is_empty() {
        String::new()
    } else {
        format!(", expected {}", expected.join(" or "))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{location}: {kind}")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub location: SourceLocation,
}

impl ParseError {
    pub fn new(kind: ErrorKind, location: SourceLocation) -> Self {
        Self { kind, location }
    }

    /// Lexical error for an invalid token
    pub fn lexical<K: TokenKind>(token: &Token<K>) -> Self {
        Self::new(
            ErrorKind::Lexical {
                text: token.text().to_string(),
            },
            token.begin().clone(),
        )
    }

    /// Syntactic error for `token` given the kinds that would have been accepted.
    ///
    /// A null token turns into [`ErrorKind::UnexpectedEnd`] and an invalid one into a
    /// lexical error.
    pub fn unexpected<K: TokenKind>(
        catalog: &TokenCatalog<K>,
        token: &Token<K>,
        expected: &[K],
    ) -> Self {
        let expected: Vec<&'static str> = expected.iter().map(|k| catalog.name_of(*k)).collect();
        if token.is_invalid() {
            return Self::lexical(token);
        }
        let kind = if token.is_null() {
            ErrorKind::UnexpectedEnd { expected }
        } else {
            ErrorKind::UnexpectedToken {
                found: catalog.name_of(token.kind()),
                text: token.text().to_string(),
                expected,
            }
        };
        Self::new(kind, token.begin().clone())
    }

    pub fn semantic(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ErrorKind::Semantic(message.into()), location)
    }
}

/// Parser results
pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_location() {
        let err = ParseError::new(
            ErrorKind::MissingPath("sub".to_string()),
            SourceLocation::at("CMakeLists.txt", 4, 1),
        );
        assert_eq!(err.to_string(), "CMakeLists.txt:4:1: path does not exist: sub");
    }

    #[test]
    fn test_expectation_lists() {
        let kind = ErrorKind::UnexpectedToken {
            found: "RightParen",
            text: ")".to_string(),
            expected: vec!["Identifier", "QuotedArgument"],
        };
        assert_eq!(
            kind.to_string(),
            "unexpected RightParen ')', expected Identifier or QuotedArgument"
        );
        let end = ErrorKind::UnexpectedEnd { expected: vec![] };
        assert_eq!(end.to_string(), "unexpected end of input");
    }
}
