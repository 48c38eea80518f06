//! # cmake-parser
//!
//! A small compiler-frontend toolkit: a regex-rule tokenizer with longest-match
//! disambiguation and pushback, a callback-driven parser loop, and two parsers built on
//! them.
//!
//! - [`lexing`]: source locations, readers, token catalogs and the tokenizer
//! - [`parsing`]: the parser executor and parse errors
//! - [`cmake`]: the CMake build-script interpreter and the model it fills
//! - [`json`]: a JSON reader
//! - [`formats`]: text and JSON output of model entities
//! - [`config`]: settings loaded from embedded defaults and user files

pub mod cmake;
pub mod config;
pub mod formats;
pub mod json;
pub mod lexing;
pub mod parsing;
