//! Log sinks.
//!
//! This module provides the [`Sink`] trait and the stateless built-in sinks.
//! The rotating file sink lives in [`crate::file_sink`].

use std::io::{self, Write};

use crate::dispatcher::Dispatcher;
use crate::types::{LogEntry, LogSeverity, LogType};

/// A consumer of log entries.
///
/// Implement this trait to create custom log destinations. Sinks are called
/// synchronously on the logging thread, so a slow sink delays the caller.
pub trait Sink: Send + Sync {
    /// Handles a single log entry.
    ///
    /// The dispatcher that delivered the entry is passed along so a sink can
    /// report its own failures back through the facility.
    fn handle(&self, entry: &LogEntry, dispatcher: &Dispatcher);
}

/// Sink that prints rendered entries to the terminal.
///
/// Error entries go to stderr, everything else to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    /// Creates a new console sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Sink for ConsoleSink {
    fn handle(&self, entry: &LogEntry, _dispatcher: &Dispatcher) {
        // A closed pipe must not take the host down with it.
        let _ = if entry.kind == LogType::Error {
            writeln!(io::stderr().lock(), "{entry}")
        } else {
            writeln!(io::stdout().lock(), "{entry}")
        };
    }
}

/// Sink that forwards entries to the `tracing` infrastructure.
///
/// Entries are emitted at tracing levels based on severity:
/// - Verbose → `tracing::debug!`
/// - Normal → `tracing::info!`
/// - Important → `tracing::warn!`
/// - Critical → `tracing::error!`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    /// Creates a new tracing sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Sink for TracingSink {
    fn handle(&self, entry: &LogEntry, _dispatcher: &Dispatcher) {
        let kind = entry.kind.code();
        let source = entry.source();
        let message = entry.message.as_str();

        match entry.severity {
            LogSeverity::Verbose => {
                tracing::debug!(target: "claw_logs", kind, %source, "{message}");
            }
            LogSeverity::Normal => {
                tracing::info!(target: "claw_logs", kind, %source, "{message}");
            }
            LogSeverity::Important => {
                tracing::warn!(target: "claw_logs", kind, %source, "{message}");
            }
            LogSeverity::Critical => {
                tracing::error!(target: "claw_logs", kind, %source, "{message}");
            }
        }
    }
}
