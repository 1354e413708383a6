//! # claw-logs
//!
//! Process-wide logging facility for Clawbernetes components.
//!
//! This crate provides:
//!
//! - [`Dispatcher`] — Sink registry and synchronous fan-out of log calls
//! - [`LogEntry`] — Immutable log record with call-site metadata
//! - [`LogSeverity`] / [`LogType`] — Importance and category of an entry
//! - [`CallerContext`] — Call site captured at compile time by [`caller!`]
//! - [`Sink`] — Trait for log destinations
//! - [`FileSink`] — Rotating log files with count/age retention
//! - [`NameTemplate`] — Fixed-width file name templates (`%r`, `%sr`, `%t`)
//! - [`ConsoleSink`] / [`TracingSink`] — Terminal and `tracing` output
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use claw_logs::{log_info, log_warn, Dispatcher, FileSink, FileSinkConfig};
//!
//! let dir = tempfile::tempdir().expect("temp dir");
//! let dispatcher = Dispatcher::new();
//! let file = Arc::new(FileSink::new(
//!     FileSinkConfig::new(dir.path()).with_name_format("node@%t.%sr.log"),
//! ));
//! dispatcher.add_sink(Arc::clone(&file));
//! dispatcher.enable();
//!
//! let entry = log_info!(dispatcher, "node {} joined", "n-1");
//! assert_eq!(entry.message, "node n-1 joined");
//! log_warn!(dispatcher, "gpu temperature high");
//!
//! assert!(file.active_file().is_some());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod caller;
pub mod dispatcher;
pub mod error;
pub mod file_sink;
pub mod sink;
pub mod template;
pub mod types;

// Re-export main types
pub use caller::CallerContext;
pub use dispatcher::{Dispatcher, SinkId, SinkSuspension, format_error, global, init};
pub use error::{LogError, Result};
pub use file_sink::{FileSink, FileSinkConfig, SweepReport};
pub use sink::{ConsoleSink, Sink, TracingSink};
pub use template::{NameTemplate, Placeholder, Segment};
pub use types::{LogEntry, LogSeverity, LogType, Source};
