//! Token kinds and rules of the build-script language

use crate::lexing::{TokenCatalog, TokenKind};
use once_cell::sync::Lazy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CMakeToken {
    Null,
    Invalid,
    Whitespace,
    Newline,
    Comment,
    LeftParen,
    RightParen,
    Identifier,
    QuotedArgument,
    UnquotedArgument,
}

impl TokenKind for CMakeToken {
    const NULL: Self = CMakeToken::Null;
    const INVALID: Self = CMakeToken::Invalid;
}

/// Rules in priority order; `Identifier` wins over `UnquotedArgument` on equal text
pub const RULES: &[(&str, CMakeToken)] = &[
    (r"[ \t\r]+", CMakeToken::Whitespace),
    (r"\r?\n", CMakeToken::Newline),
    (r"#[^\r\n]*", CMakeToken::Comment),
    (r"\(", CMakeToken::LeftParen),
    (r"\)", CMakeToken::RightParen),
    (r"[_a-zA-Z][_a-zA-Z0-9]*", CMakeToken::Identifier),
    (r#"(?s)"([^"\\]|\\.)*""#, CMakeToken::QuotedArgument),
    (r#"([^\s()#"\\]|\\.)+"#, CMakeToken::UnquotedArgument),
];

pub const NAMES: &[(CMakeToken, &str)] = &[
    (CMakeToken::Null, "Null"),
    (CMakeToken::Invalid, "Invalid"),
    (CMakeToken::Whitespace, "Whitespace"),
    (CMakeToken::Newline, "Newline"),
    (CMakeToken::Comment, "Comment"),
    (CMakeToken::LeftParen, "LeftParen"),
    (CMakeToken::RightParen, "RightParen"),
    (CMakeToken::Identifier, "Identifier"),
    (CMakeToken::QuotedArgument, "QuotedArgument"),
    (CMakeToken::UnquotedArgument, "UnquotedArgument"),
];

/// Tokens the interpreter never looks at
pub const SKIPPED: [CMakeToken; 3] = [
    CMakeToken::Whitespace,
    CMakeToken::Newline,
    CMakeToken::Comment,
];

/// Kinds usable as a command argument
pub const ARGUMENT: [CMakeToken; 3] = [
    CMakeToken::Identifier,
    CMakeToken::QuotedArgument,
    CMakeToken::UnquotedArgument,
];

static CATALOG: Lazy<TokenCatalog<CMakeToken>> =
    Lazy::new(|| TokenCatalog::new(RULES, NAMES).unwrap());

/// The shared build-script rule table
pub fn catalog() -> &'static TokenCatalog<CMakeToken> {
    &CATALOG
}
