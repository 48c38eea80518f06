//! `message()` modes and recorded messages

use crate::lexing::SourceLocation;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageMode {
    FatalError,
    SendError,
    Warning,
    AuthorWarning,
    Deprecation,
    Notice,
    Status,
    Verbose,
    Debug,
    Trace,
}

impl MessageMode {
    pub const ALL: [MessageMode; 10] = [
        MessageMode::FatalError,
        MessageMode::SendError,
        MessageMode::Warning,
        MessageMode::AuthorWarning,
        MessageMode::Deprecation,
        MessageMode::Notice,
        MessageMode::Status,
        MessageMode::Verbose,
        MessageMode::Debug,
        MessageMode::Trace,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MessageMode::FatalError => "FATAL_ERROR",
            MessageMode::SendError => "SEND_ERROR",
            MessageMode::Warning => "WARNING",
            MessageMode::AuthorWarning => "AUTHOR_WARNING",
            MessageMode::Deprecation => "DEPRECATION",
            MessageMode::Notice => "NOTICE",
            MessageMode::Status => "STATUS",
            MessageMode::Verbose => "VERBOSE",
            MessageMode::Debug => "DEBUG",
            MessageMode::Trace => "TRACE",
        }
    }
}

impl Default for MessageMode {
    fn default() -> Self {
        MessageMode::Notice
    }
}

impl fmt::Display for MessageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive parse of a mode keyword
impl FromStr for MessageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| s.to_string())
    }
}

/// A message emitted by the script
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Message {
    pub mode: MessageMode,
    pub text: String,
    #[serde(serialize_with = "serialize_location")]
    pub location: SourceLocation,
}

fn serialize_location<S: serde::Serializer>(
    location: &SourceLocation,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(location)
}

impl Message {
    /// Forward the message to the log at a level matching its mode
    pub fn log(&self) {
        let at = &self.location;
        match self.mode {
            MessageMode::FatalError | MessageMode::SendError => {
                tracing::error!(mode = %self.mode, %at, "{}", self.text)
            }
            MessageMode::Warning | MessageMode::AuthorWarning | MessageMode::Deprecation => {
                tracing::warn!(mode = %self.mode, %at, "{}", self.text)
            }
            MessageMode::Notice | MessageMode::Status => {
                tracing::info!(mode = %self.mode, %at, "{}", self.text)
            }
            MessageMode::Verbose | MessageMode::Debug => {
                tracing::debug!(mode = %self.mode, %at, "{}", self.text)
            }
            MessageMode::Trace => tracing::trace!(mode = %self.mode, %at, "{}", self.text),
        }
    }
}
