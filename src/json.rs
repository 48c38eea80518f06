//! JSON reader
//!
//! A second consumer of the generic tokenizer and executor: [`parse`] reads one JSON
//! document into a [`Value`]. Numbers keep their source spelling so no precision is lost;
//! object members are kept in key order, a repeated key keeps its last value. Anything but
//! whitespace after the document is an error. Arrays and objects nest at most
//! [`MAX_NESTING`] levels deep.

use crate::lexing::{SourceLocation, Token, TokenCatalog, TokenKind, Tokenizer};
use crate::parsing::{ErrorKind, Flow, ParseError, ParseResult, ParserCallback, ParserExecutor};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonToken {
    End,
    Invalid,
    Whitespace,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Colon,
    Comma,
    True,
    False,
    Null,
    Number,
    String,
}

impl TokenKind for JsonToken {
    const NULL: Self = JsonToken::End;
    const INVALID: Self = JsonToken::Invalid;
}

const RULES: &[(&str, JsonToken)] = &[
    (r"[ \t\r\n]+", JsonToken::Whitespace),
    (r"\{", JsonToken::LeftBrace),
    (r"\}", JsonToken::RightBrace),
    (r"\[", JsonToken::LeftBracket),
    (r"\]", JsonToken::RightBracket),
    (":", JsonToken::Colon),
    (",", JsonToken::Comma),
    ("true", JsonToken::True),
    ("false", JsonToken::False),
    ("null", JsonToken::Null),
    (r"-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?", JsonToken::Number),
    (
        r#""([^"\\\x00-\x1f]|\\["\\/bfnrt]|\\u[0-9a-fA-F]{4})*""#,
        JsonToken::String,
    ),
];

const NAMES: &[(JsonToken, &str)] = &[
    (JsonToken::End, "end of input"),
    (JsonToken::Whitespace, "whitespace"),
    (JsonToken::LeftBrace, "'{'"),
    (JsonToken::RightBrace, "'}'"),
    (JsonToken::LeftBracket, "'['"),
    (JsonToken::RightBracket, "']'"),
    (JsonToken::Colon, "':'"),
    (JsonToken::Comma, "','"),
    (JsonToken::True, "true"),
    (JsonToken::False, "false"),
    (JsonToken::Null, "null"),
    (JsonToken::Number, "number"),
    (JsonToken::String, "string"),
];

const VALUE_START: [JsonToken; 7] = [
    JsonToken::LeftBrace,
    JsonToken::LeftBracket,
    JsonToken::String,
    JsonToken::Number,
    JsonToken::True,
    JsonToken::False,
    JsonToken::Null,
];

static CATALOG: Lazy<TokenCatalog<JsonToken>> =
    Lazy::new(|| TokenCatalog::new(RULES, NAMES).unwrap());

pub fn catalog() -> &'static TokenCatalog<JsonToken> {
    &CATALOG
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    /// Source spelling of the number
    Number(String),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&str> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_number()?.parse().ok()
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_number()?.parse().ok()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(members) => Some(members),
            _ => None,
        }
    }

    /// Member `key` of an object
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object()?.get(key)
    }

    /// Element `index` of an array
    pub fn at(&self, index: usize) -> Option<&Value> {
        self.as_array()?.get(index)
    }
}

/// Deepest array or object nesting a document may use
pub const MAX_NESTING: usize = 256;

/// Parse a whole JSON document
pub fn parse(text: &str) -> ParseResult<Value> {
    parse_named("<json>", text)
}

/// Parse a JSON document, attributing locations to `file`
pub fn parse_named(file: &str, text: &str) -> ParseResult<Value> {
    let mut tokenizer = Tokenizer::from_string(catalog(), file, text);
    let executor = ParserExecutor::new([JsonToken::Whitespace]);
    let mut reader = DocumentReader {
        executor: executor.clone(),
        value: None,
        error: None,
    };
    if executor.parse(&mut tokenizer, &mut reader) {
        if let Some(value) = reader.value {
            return Ok(value);
        }
    }
    Err(reader.error.unwrap_or_else(|| {
        ParseError::new(
            ErrorKind::UnexpectedEnd {
                expected: vec!["value"],
            },
            tokenizer.location().clone(),
        )
    }))
}

/// Reads the single top-level value and rejects anything after it
struct DocumentReader {
    executor: ParserExecutor<JsonToken>,
    value: Option<Value>,
    error: Option<ParseError>,
}

impl DocumentReader {
    /// Value starting with `token`, which sits inside `depth` open arrays or objects
    fn read_value(
        &self,
        token: Token<JsonToken>,
        tokenizer: &mut Tokenizer<'_, JsonToken>,
        depth: usize,
    ) -> ParseResult<Value> {
        let opens = matches!(token.kind(), JsonToken::LeftBracket | JsonToken::LeftBrace);
        if opens && depth >= MAX_NESTING {
            return Err(ParseError::new(
                ErrorKind::RecursionLimit(MAX_NESTING),
                token.begin().clone(),
            ));
        }
        match token.kind() {
            JsonToken::Null => Ok(Value::Null),
            JsonToken::True => Ok(Value::Bool(true)),
            JsonToken::False => Ok(Value::Bool(false)),
            JsonToken::Number => Ok(Value::Number(token.into_text())),
            JsonToken::String => decode_string(token.text(), token.begin()).map(Value::String),
            JsonToken::LeftBracket => self.array(tokenizer, depth + 1),
            JsonToken::LeftBrace => self.object(tokenizer, depth + 1),
            _ => Err(ParseError::unexpected(tokenizer.catalog(), &token, &VALUE_START)),
        }
    }

    fn array(&self, tokenizer: &mut Tokenizer<'_, JsonToken>, depth: usize) -> ParseResult<Value> {
        let mut items = Vec::new();
        if self.executor.peek(tokenizer).is(JsonToken::RightBracket) {
            self.executor.next_token(tokenizer);
            return Ok(Value::Array(items));
        }
        loop {
            let token = self.executor.next_token(tokenizer);
            items.push(self.read_value(token, tokenizer, depth)?);
            let separator = self
                .executor
                .expect(tokenizer, &[JsonToken::Comma, JsonToken::RightBracket])?;
            if separator.is(JsonToken::RightBracket) {
                return Ok(Value::Array(items));
            }
        }
    }

    fn object(&self, tokenizer: &mut Tokenizer<'_, JsonToken>, depth: usize) -> ParseResult<Value> {
        let mut members = BTreeMap::new();
        if self.executor.peek(tokenizer).is(JsonToken::RightBrace) {
            self.executor.next_token(tokenizer);
            return Ok(Value::Object(members));
        }
        loop {
            let key = self.executor.expect(tokenizer, &[JsonToken::String])?;
            let key = decode_string(key.text(), key.begin())?;
            self.executor.expect(tokenizer, &[JsonToken::Colon])?;
            let token = self.executor.next_token(tokenizer);
            members.insert(key, self.read_value(token, tokenizer, depth)?);
            let separator = self
                .executor
                .expect(tokenizer, &[JsonToken::Comma, JsonToken::RightBrace])?;
            if separator.is(JsonToken::RightBrace) {
                return Ok(Value::Object(members));
            }
        }
    }
}

impl ParserCallback<JsonToken> for DocumentReader {
    fn on_token(
        &mut self,
        token: Token<JsonToken>,
        tokenizer: &mut Tokenizer<'_, JsonToken>,
    ) -> ParseResult<Flow<JsonToken>> {
        if self.value.is_some() {
            return Err(ParseError::unexpected(
                tokenizer.catalog(),
                &token,
                &[JsonToken::End],
            ));
        }
        self.value = Some(self.read_value(token, tokenizer, 0)?);
        Ok(Flow::Continue)
    }

    fn on_no_more_token(&mut self, _location: &SourceLocation) -> bool {
        self.value.is_some()
    }

    fn on_parse_error(&mut self, error: ParseError) {
        self.error = Some(error);
    }
}

/// Contents of a string token with escapes resolved
fn decode_string(text: &str, at: &SourceLocation) -> ParseResult<String> {
    let body = &text[1..text.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => {
                let high = hex4(&mut chars);
                let code = if (0xD800..0xDC00).contains(&high) {
                    let mut lookahead = chars.clone();
                    match (lookahead.next(), lookahead.next()) {
                        (Some('\\'), Some('u')) => {
                            let low = hex4(&mut lookahead);
                            if (0xDC00..0xE000).contains(&low) {
                                chars = lookahead;
                                0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
                            } else {
                                high
                            }
                        }
                        _ => high,
                    }
                } else {
                    high
                };
                let decoded = char::from_u32(code).ok_or_else(|| {
                    ParseError::semantic(format!("invalid code point U+{code:04X}"), at.clone())
                })?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => break,
        }
    }
    Ok(out)
}

/// Four hex digits; the token rule guarantees they are present
fn hex4(chars: &mut std::str::Chars<'_>) -> u32 {
    chars
        .take(4)
        .fold(0, |acc, c| acc * 16 + c.to_digit(16).unwrap_or(0))
}
