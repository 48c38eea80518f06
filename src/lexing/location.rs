//! Source locations
//!
//! A [`SourceLocation`] names a point in an input: the file it came from plus a 1-based
//! line and column. Locations are advanced one character at a time by the
//! [`Reader`](super::Reader) as it hands characters to the tokenizer:
//!
//! - `'\n'` moves to the first column of the next line
//! - `'\r'` returns to the first column of the same line
//! - anything else moves one column to the right
//!
//! Locations are plain values. The tokenizer copies them into every [`Token`](super::Token)
//! it produces and hands them back to the reader when it pushes lookahead text back, so a
//! location must always be cheap to clone. The file name is therefore shared.

use std::fmt;
use std::sync::Arc;

/// A (file, line, column) position in source text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    file: Arc<str>,
    line: usize,
    column: usize,
}

impl SourceLocation {
    /// Location of the first character of `file`
    pub fn new(file: impl AsRef<str>) -> Self {
        Self::at(file, 1, 1)
    }

    /// Location at an explicit line and column
    pub fn at(file: impl AsRef<str>, line: usize, column: usize) -> Self {
        Self {
            file: Arc::from(file.as_ref()),
            line,
            column,
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Advance past one consumed character
    pub fn advance(&mut self, ch: char) {
        match ch {
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            '\r' => self.column = 1,
            _ => self.column += 1,
        }
    }

    /// Advance past every character of `text`
    pub fn advance_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.advance(ch);
        }
    }

    /// Ordering key ignoring the file name
    pub fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::new("")
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file.is_empty() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "{}:{}:{}", self.file, self.line, self.column)
        }
    }
}
