//! # claw-logctl
//!
//! Operator CLI for [`claw_logs`] file sinks.
//!
//! Provides commands for:
//! - Writing a message through a configured file sink
//! - Running a retention sweep over a log directory
//! - Generating file names from a name template
//! - Checking which file names a template recognizes

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;

pub use cli::{Cli, Commands, Kind, Severity, SinkArgs, WriteArgs};
pub use error::CliError;
