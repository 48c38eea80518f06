//! Lexing
//!
//! The generic, rule-driven half of the toolkit. Nothing in here knows about CMake or
//! JSON: a consumer declares a kind enum implementing [`TokenKind`], builds a
//! [`TokenCatalog`] of regular-expression rules for it, and reads [`Token`]s from a
//! [`Tokenizer`].
//!
//! The pieces, leaf first:
//!
//! - [`SourceLocation`]: file, line and column, advanced per consumed character
//! - [`Reader`]: characters from a stream, with location tracking and pushback
//! - [`TokenCatalog`]: ordered rules plus kind names
//! - [`Tokenizer`]: longest-match engine with bounded lookahead and token pushback

pub mod catalog;
pub mod location;
pub mod reader;
pub mod token;
pub mod tokenizer;

pub use catalog::{TokenCatalog, TokenRule};
pub use location::SourceLocation;
pub use reader::Reader;
pub use token::{Token, TokenKind};
pub use tokenizer::{Tokenizer, MAX_LOOKAHEAD};
