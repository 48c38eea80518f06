//! Parser executor that drives a callback with tokens
//!
//! [`ParserExecutor::parse`] is the control loop shared by every parser in the crate. It
//! pulls tokens from a [`Tokenizer`], filters out the kinds configured as skippable, and
//! hands everything else to a [`ParserCallback`]:
//!
//! - a null token ends the loop; [`ParserCallback::on_no_more_token`] decides the result
//! - an invalid token is reported through [`ParserCallback::on_parse_error`] and fails
//! - a skippable token goes to [`ParserCallback::on_skip_token`]
//! - any other token goes to [`ParserCallback::on_token`]
//!
//! The callback answers with a [`Flow`]. [`Flow::Stop`] ends the loop successfully and
//! puts the returned token back on the tokenizer, so whoever continues parsing sees it
//! again. An `Err` from the callback is reported and fails the loop.
//!
//! The callback also receives the tokenizer, so a handler can pull the rest of a construct
//! directly (see [`ParserExecutor::expect`]) before returning to the loop.

use crate::lexing::{SourceLocation, Token, TokenKind, Tokenizer};
use crate::parsing::error::{ParseError, ParseResult};
use std::collections::HashSet;

/// What the executor does after a callback has seen a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow<K> {
    /// Keep reading
    Continue,
    /// Stop successfully and requeue the token
    Stop(Token<K>),
}

/// Parser-side hooks invoked by [`ParserExecutor`]
pub trait ParserCallback<K: TokenKind> {
    /// A token that is not in the skip set
    fn on_token(
        &mut self,
        token: Token<K>,
        tokenizer: &mut Tokenizer<'_, K>,
    ) -> ParseResult<Flow<K>>;

    /// A token in the skip set
    fn on_skip_token(&mut self, _token: &Token<K>) {}

    /// End of input reached; the return value is the result of the parse
    fn on_no_more_token(&mut self, _location: &SourceLocation) -> bool {
        true
    }

    /// A lexical error, or an error returned by [`on_token`](Self::on_token)
    fn on_parse_error(&mut self, error: ParseError);
}

/// Token loop with a configurable skip set
#[derive(Debug, Clone)]
pub struct ParserExecutor<K> {
    skip: HashSet<K>,
}

impl<K: TokenKind> ParserExecutor<K> {
    pub fn new(skip: impl IntoIterator<Item = K>) -> Self {
        Self {
            skip: skip.into_iter().collect(),
        }
    }

    /// Whether tokens of `kind` bypass the callback
    pub fn skips(&self, kind: K) -> bool {
        self.skip.contains(&kind)
    }

    /// Run the loop until end of input, a failure, or a [`Flow::Stop`]
    pub fn parse<C>(&self, tokenizer: &mut Tokenizer<'_, K>, callback: &mut C) -> bool
    where
        C: ParserCallback<K> + ?Sized,
    {
        loop {
            let token = tokenizer.get_token();
            if token.is_null() {
                return callback.on_no_more_token(token.begin());
            }
            if token.is_invalid() {
                callback.on_parse_error(ParseError::lexical(&token));
                return false;
            }
            if self.skips(token.kind()) {
                callback.on_skip_token(&token);
                continue;
            }
            match callback.on_token(token, tokenizer) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop(token)) => {
                    tokenizer.unget_token(token);
                    return true;
                }
                Err(error) => {
                    callback.on_parse_error(error);
                    return false;
                }
            }
        }
    }

    /// Next token outside the skip set (null at end of input)
    pub fn next_token(&self, tokenizer: &mut Tokenizer<'_, K>) -> Token<K> {
        loop {
            let token = tokenizer.get_token();
            if token.is_null() || token.is_invalid() || !self.skips(token.kind()) {
                return token;
            }
        }
    }

    /// Next token outside the skip set, which must be one of `kinds`
    pub fn expect(&self, tokenizer: &mut Tokenizer<'_, K>, kinds: &[K]) -> ParseResult<Token<K>> {
        let token = self.next_token(tokenizer);
        if kinds.contains(&token.kind()) {
            Ok(token)
        } else {
            Err(ParseError::unexpected(tokenizer.catalog(), &token, kinds))
        }
    }

    /// Look at the next token outside the skip set without consuming it
    pub fn peek(&self, tokenizer: &mut Tokenizer<'_, K>) -> Token<K> {
        let token = self.next_token(tokenizer);
        tokenizer.unget_token(token.clone());
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexing::TokenCatalog;
    use crate::parsing::error::ErrorKind;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        Null,
        Invalid,
        Space,
        Word,
        Semi,
    }

    impl TokenKind for Kind {
        const NULL: Self = Kind::Null;
        const INVALID: Self = Kind::Invalid;
    }

    fn catalog() -> TokenCatalog<Kind> {
        TokenCatalog::new(
            &[(r"[ \n]+", Kind::Space), (r"[a-z]+", Kind::Word), (";", Kind::Semi)],
            &[(Kind::Space, "Space"), (Kind::Word, "Word"), (Kind::Semi, "Semi")],
        )
        .unwrap()
    }

    /// Records everything and stops at the first `;`
    #[derive(Default)]
    struct Recorder {
        words: Vec<String>,
        skipped: usize,
        errors: Vec<ParseError>,
        ended: bool,
        fail_on: Option<&'static str>,
    }

    impl ParserCallback<Kind> for Recorder {
        fn on_token(
            &mut self,
            token: Token<Kind>,
            tokenizer: &mut Tokenizer<'_, Kind>,
        ) -> ParseResult<Flow<Kind>> {
            if token.is(Kind::Semi) {
                return Ok(Flow::Stop(token));
            }
            if Some(token.text()) == self.fail_on {
                return Err(ParseError::unexpected(tokenizer.catalog(), &token, &[Kind::Semi]));
            }
            self.words.push(token.text().to_string());
            Ok(Flow::Continue)
        }

        fn on_skip_token(&mut self, _token: &Token<Kind>) {
            self.skipped += 1;
        }

        fn on_no_more_token(&mut self, _location: &SourceLocation) -> bool {
            self.ended = true;
            true
        }

        fn on_parse_error(&mut self, error: ParseError) {
            self.errors.push(error);
        }
    }

    #[test]
    fn test_skip_set_and_end_of_input() {
        let catalog = catalog();
        let mut tokenizer = Tokenizer::from_string(&catalog, "t", "a b\nc");
        let mut recorder = Recorder::default();
        assert!(ParserExecutor::new([Kind::Space]).parse(&mut tokenizer, &mut recorder));
        assert_eq!(recorder.words, vec!["a", "b", "c"]);
        assert_eq!(recorder.skipped, 2);
        assert!(recorder.ended);
    }

    #[test]
    fn test_stop_requeues_token() {
        let catalog = catalog();
        let mut tokenizer = Tokenizer::from_string(&catalog, "t", "a ; b");
        let mut recorder = Recorder::default();
        let executor = ParserExecutor::new([Kind::Space]);
        assert!(executor.parse(&mut tokenizer, &mut recorder));
        assert!(!recorder.ended);
        assert_eq!(tokenizer.get_token().text(), ";");

        assert!(executor.parse(&mut tokenizer, &mut recorder));
        assert_eq!(recorder.words, vec!["a", "b"]);
    }

    #[test]
    fn test_callback_error_fails_parse() {
        let catalog = catalog();
        let mut tokenizer = Tokenizer::from_string(&catalog, "t", "a bad c");
        let mut recorder = Recorder {
            fail_on: Some("bad"),
            ..Recorder::default()
        };
        assert!(!ParserExecutor::new([Kind::Space]).parse(&mut tokenizer, &mut recorder));
        assert_eq!(recorder.words, vec!["a"]);
        assert_eq!(recorder.errors.len(), 1);
    }

    #[test]
    fn test_invalid_token_is_lexical_error() {
        let catalog = catalog();
        let mut tokenizer = Tokenizer::from_string(&catalog, "t", "a 42");
        let mut recorder = Recorder::default();
        assert!(!ParserExecutor::new([Kind::Space]).parse(&mut tokenizer, &mut recorder));
        assert_eq!(
            recorder.errors[0].kind,
            ErrorKind::Lexical {
                text: "42".to_string()
            }
        );
    }

    #[test]
    fn test_expect_and_peek() {
        let catalog = catalog();
        let mut tokenizer = Tokenizer::from_string(&catalog, "t", "  word ;");
        let executor = ParserExecutor::new([Kind::Space]);
        assert_eq!(executor.peek(&mut tokenizer).text(), "word");
        assert_eq!(executor.expect(&mut tokenizer, &[Kind::Word]).unwrap().text(), "word");

        let err = executor.expect(&mut tokenizer, &[Kind::Word]).unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::UnexpectedToken {
                found: "Semi",
                text: ";".to_string(),
                expected: vec!["Word"],
            }
        );

        let err = executor.expect(&mut tokenizer, &[Kind::Word]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedEnd { expected: vec!["Word"] });
    }
}
