//! Token values produced by the tokenizer
//!
//! Every consumer of the tokenizer brings its own kind enum. The enum only has to name two
//! reserved kinds through [`TokenKind`]: the *null* kind that marks end of input and the
//! *invalid* kind that marks text no rule could match.

use super::location::SourceLocation;
use std::fmt::Debug;
use std::hash::Hash;

/// A token kind enum usable by [`Tokenizer`](super::Tokenizer)
pub trait TokenKind: Copy + Eq + Hash + Debug + 'static {
    /// Kind of the end-of-stream token
    const NULL: Self;
    /// Kind of the token produced for unmatched text
    const INVALID: Self;
}

/// One lexeme with its kind and source span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<K> {
    kind: K,
    text: String,
    begin: SourceLocation,
    end: SourceLocation,
}

impl<K: TokenKind> Token<K> {
    pub fn new(
        kind: K,
        text: impl Into<String>,
        begin: SourceLocation,
        end: SourceLocation,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            begin,
            end,
        }
    }

    /// End-of-stream marker at `location`
    pub fn null(location: SourceLocation) -> Self {
        Self::new(K::NULL, "", location.clone(), location)
    }

    pub fn kind(&self) -> K {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Location of the first character
    pub fn begin(&self) -> &SourceLocation {
        &self.begin
    }

    /// Location just past the last character
    pub fn end(&self) -> &SourceLocation {
        &self.end
    }

    pub fn is_null(&self) -> bool {
        self.kind == K::NULL
    }

    pub fn is_invalid(&self) -> bool {
        self.kind == K::INVALID
    }

    pub fn is(&self, kind: K) -> bool {
        self.kind == kind
    }
}
