//! Longest-match tokenizer
//!
//! The tokenizer turns a [`Reader`] into [`Token`]s using the rules of a [`TokenCatalog`].
//!
//! Matching
//!
//!     Characters are appended one at a time to a candidate string and every rule is tested
//!     against the whole candidate. Each time at least one rule matches, the candidate
//!     becomes the tentative token (named by the earliest matching rule) and reading goes
//!     on, because a longer candidate may still match. Once the candidate stops matching,
//!     reading continues for at most [`MAX_LOOKAHEAD`] more characters in case a longer
//!     match appears again (`1.` does not match a number rule but `1.5` does). When the
//!     lookahead runs out, or the input ends, the tentative token is accepted and the
//!     over-read characters are pushed back into the reader with the location they were
//!     read at, so token ends and the next token's start stay exact.
//!
//!     Before anything has matched there is no bound: a quoted string only matches once its
//!     closing quote is read. If the input ends with a non-empty candidate that never
//!     matched, the whole scanned text comes back as an invalid token.
//!
//! Pushback
//!
//!     [`Tokenizer::unget_token`] pushes a token onto a stack; [`Tokenizer::get_token`]
//!     pops from that stack before reading any more input. Any depth is allowed and tokens
//!     come back in reverse order of being pushed.

use super::catalog::TokenCatalog;
use super::location::SourceLocation;
use super::reader::Reader;
use super::token::{Token, TokenKind};

/// Characters read past the last matching prefix before giving up on a longer match.
///
/// Rule sets where a longer match can only be confirmed further than this past a shorter
/// one will tokenize the shorter match.
pub const MAX_LOOKAHEAD: usize = 10;

pub struct Tokenizer<'c, K> {
    catalog: &'c TokenCatalog<K>,
    reader: Reader,
    pushed: Vec<Token<K>>,
}

impl<'c, K: TokenKind> Tokenizer<'c, K> {
    pub fn new(catalog: &'c TokenCatalog<K>, reader: Reader) -> Self {
        Self {
            catalog,
            reader,
            pushed: Vec::new(),
        }
    }

    /// Tokenize an in-memory string attributed to `file`
    pub fn from_string(
        catalog: &'c TokenCatalog<K>,
        file: impl AsRef<str>,
        source: impl Into<String>,
    ) -> Self {
        Self::new(catalog, Reader::from_string(file, source))
    }

    pub fn catalog(&self) -> &'c TokenCatalog<K> {
        self.catalog
    }

    /// Location the next token will start at
    pub fn location(&self) -> &SourceLocation {
        match self.pushed.last() {
            Some(token) => token.begin(),
            None => self.reader.location(),
        }
    }

    /// Next token; a null token at end of input, an invalid token for unmatched text
    pub fn get_token(&mut self) -> Token<K> {
        if let Some(token) = self.pushed.pop() {
            return token;
        }

        let begin = self.reader.location().clone();
        let mut candidate = String::new();
        let mut accepted: Option<(K, usize, SourceLocation)> = None;
        let mut lookahead = 0;

        while let Some(ch) = self.reader.get_char() {
            candidate.push(ch);
            if let Some(kind) = self.catalog.first_match(&candidate) {
                accepted = Some((kind, candidate.len(), self.reader.location().clone()));
                lookahead = 0;
            } else if accepted.is_some() {
                lookahead += 1;
                if lookahead >= MAX_LOOKAHEAD {
                    break;
                }
            }
        }

        let token = match accepted {
            Some((kind, length, end)) => {
                let extended = candidate.split_off(length);
                self.reader.push_back(&extended, end.clone());
                Token::new(kind, candidate, begin, end)
            }
            None if candidate.is_empty() => Token::null(begin),
            None => {
                let end = self.reader.location().clone();
                Token::new(K::INVALID, candidate, begin, end)
            }
        };

        tracing::trace!(
            kind = self.catalog.name_of(token.kind()),
            text = %token.text().escape_debug(),
            at = %token.begin(),
            "token"
        );
        token
    }

    /// Push `token` back; the next [`get_token`](Self::get_token) returns it
    pub fn unget_token(&mut self, token: Token<K>) {
        self.pushed.push(token);
    }

    /// Read every remaining token up to and including the first null or invalid one
    pub fn collect_all(&mut self) -> Vec<Token<K>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.get_token();
            let last = token.is_null() || token.is_invalid();
            tokens.push(token);
            if last {
                return tokens;
            }
        }
    }

    /// I/O error that cut the input short, if any
    pub fn take_read_error(&mut self) -> Option<std::io::Error> {
        self.reader.take_error()
    }
}
