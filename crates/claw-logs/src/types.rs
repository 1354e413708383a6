//! Core types for the logging facility.
//!
//! This module provides:
//! - [`LogSeverity`] — How important an entry is
//! - [`LogType`] — What category an entry falls into
//! - [`Source`] — Where an entry was logged from
//! - [`LogEntry`] — The immutable record handed to every sink

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Placeholder rendered when the source of an entry is not known.
pub const UNKNOWN_SOURCE: &str = "UNKN";

/// Severity of a log entry, ordered from least to most important.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum LogSeverity {
    /// Chatty detail, usually filtered out.
    Verbose,
    /// Regular operational messages.
    #[default]
    Normal,
    /// Something that deserves attention.
    Important,
    /// Something is badly broken.
    Critical,
}

impl LogSeverity {
    /// Returns the full name of this severity.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Verbose => "Verbose",
            Self::Normal => "Normal",
            Self::Important => "Important",
            Self::Critical => "Critical",
        }
    }

    /// Returns the four-letter code of this severity.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Verbose => "VERB",
            Self::Normal => "NORM",
            Self::Important => "IMPT",
            Self::Critical => "CRIT",
        }
    }
}

impl fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a log entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogType {
    /// Informational message.
    #[default]
    Info,
    /// Warning condition.
    Warning,
    /// Error condition.
    Error,
}

impl LogType {
    /// Returns the full name of this type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }

    /// Returns the short code of this type.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARN",
            Self::Error => "ERR",
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a log entry originated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Source {
    /// Name of the originating module (crate).
    pub module: String,
    /// Source file path.
    pub file: String,
    /// Name of the calling function.
    pub member: String,
    /// Line number of the call, if known.
    pub line: Option<u32>,
}

impl Source {
    /// Returns true if every field of the source is set.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.line.is_some()
            && !self.module.trim().is_empty()
            && !self.file.trim().is_empty()
            && !self.member.trim().is_empty()
    }

    /// Returns the file path, starting at the module name if it occurs in it.
    #[must_use]
    pub fn relative_file(&self) -> &str {
        let dashed = self.module.replace('_', "-");
        [self.module.as_str(), dashed.as_str()]
            .into_iter()
            .filter(|needle| !needle.is_empty())
            .find_map(|needle| self.file.find(needle))
            .map_or(self.file.as_str(), |idx| &self.file[idx..])
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) if self.is_known() => {
                write!(f, "{}@{}:{line}", self.relative_file(), self.member)
            }
            _ => f.write_str(UNKNOWN_SOURCE),
        }
    }
}

/// A single log record.
///
/// Entries are built once per log call and handed to every sink by
/// reference; sinks never modify them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// The log message.
    pub message: String,
    /// How important the entry is.
    pub severity: LogSeverity,
    /// What category the entry falls into.
    #[serde(rename = "type")]
    pub kind: LogType,
    /// Local time at which the entry was created.
    pub timestamp: NaiveDateTime,
    /// Where the entry was logged from.
    pub source: Source,
}

impl LogEntry {
    /// Creates a new log entry.
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        severity: LogSeverity,
        kind: LogType,
        timestamp: NaiveDateTime,
        source: Source,
    ) -> Self {
        Self {
            message: message.into(),
            severity,
            kind,
            timestamp,
            source,
        }
    }

    /// Returns the sentinel entry produced when a log call cannot be resolved.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            message: String::new(),
            severity: LogSeverity::Normal,
            kind: LogType::Info,
            timestamp: NaiveDateTime::MIN,
            source: Source::default(),
        }
    }

    /// Returns true if this is the sentinel entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }

    /// Renders the source descriptor, or `UNKN` if any part is missing.
    #[must_use]
    pub fn source(&self) -> String {
        self.source.to_string()
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} {} @ {}] {} :: {}",
            self.severity,
            self.kind,
            self.timestamp.format("%y:%m:%d:%H:%M:%S"),
            self.source,
            self.message
        )
    }
}
