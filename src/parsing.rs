//! Parsing
//!
//! Token-driven control loop shared by the concrete parsers ([`crate::cmake`] and
//! [`crate::json`]) and the error type they report with.

pub mod error;
pub mod executor;

pub use error::{ErrorKind, ParseError, ParseResult};
pub use executor::{Flow, ParserCallback, ParserExecutor};
