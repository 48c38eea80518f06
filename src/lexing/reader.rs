//! Character reader with location tracking and pushback
//!
//! The reader pulls characters out of any [`BufRead`] one line at a time and keeps the
//! [`SourceLocation`] of the next character current. The tokenizer reads speculatively
//! past the end of a token while it looks for a longer match; whatever it over-read is
//! handed back through [`Reader::push_back`] together with the location it was read at,
//! so the next read starts exactly where the accepted token ended.

use super::location::SourceLocation;
use std::collections::VecDeque;
use std::io::{self, BufRead, Cursor};

pub struct Reader {
    input: Box<dyn BufRead>,
    pending: VecDeque<char>,
    location: SourceLocation,
    exhausted: bool,
    error: Option<io::Error>,
}

impl Reader {
    /// Read from an arbitrary buffered stream
    pub fn new(file: impl AsRef<str>, input: Box<dyn BufRead>) -> Self {
        Self {
            input,
            pending: VecDeque::new(),
            location: SourceLocation::new(file),
            exhausted: false,
            error: None,
        }
    }

    /// Read from an in-memory string
    pub fn from_string(file: impl AsRef<str>, source: impl Into<String>) -> Self {
        Self::new(file, Box::new(Cursor::new(source.into())))
    }

    /// Location of the next character to be read
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// Consume the next character, or `None` at end of input
    pub fn get_char(&mut self) -> Option<char> {
        if self.pending.is_empty() && !self.fill() {
            return None;
        }
        let ch = self.pending.pop_front()?;
        self.location.advance(ch);
        Some(ch)
    }

    /// Return `text` to the front of the input.
    ///
    /// `text` must be the characters consumed immediately before the current position and
    /// `location` the location its first character was read at.
    pub fn push_back(&mut self, text: &str, location: SourceLocation) {
        if text.is_empty() {
            return;
        }
        for ch in text.chars().rev() {
            self.pending.push_front(ch);
        }
        self.location = location;
    }

    /// True once the input is exhausted and nothing has been pushed back
    pub fn at_end(&mut self) -> bool {
        self.pending.is_empty() && !self.fill()
    }

    /// I/O error that ended the input early, if any
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    fn fill(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => {
                self.exhausted = true;
                false
            }
            Ok(_) => {
                self.pending.extend(line.chars());
                true
            }
            Err(err) => {
                tracing::warn!(file = %self.location.file(), error = %err, "input read failed");
                self.exhausted = true;
                self.error = Some(err);
                false
            }
        }
    }
}

impl std::fmt::Debug for Reader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("location", &self.location)
            .field("pending", &self.pending.len())
            .field("exhausted", &self.exhausted)
            .finish()
    }
}
