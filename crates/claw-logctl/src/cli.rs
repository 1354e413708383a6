//! Command-line argument parsing with clap.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use claw_logs::{FileSinkConfig, LogSeverity, LogType};

use crate::error::CliError;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Inspect and drive claw-logs file sinks.
#[derive(Parser, Debug, Clone)]
#[command(name = "clawlog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Append a message to the sink's active log file.
    Write(WriteArgs),

    /// Delete log files beyond the configured count or age.
    Sweep(SinkArgs),

    /// Print file names generated from a template.
    Generate {
        /// Name template, e.g. `app@%t.%sr.log`.
        template: String,

        /// Number of names to generate.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },

    /// Check whether file names could have been generated by a template.
    Match {
        /// Name template, e.g. `app@%t.%sr.log`.
        template: String,

        /// File names to test.
        #[arg(required = true)]
        names: Vec<String>,
    },
}

/// Arguments of the `write` subcommand.
#[derive(Args, Debug, Clone)]
pub struct WriteArgs {
    /// Message to log.
    pub message: String,

    /// Severity of the entry.
    #[arg(short, long, value_enum, default_value_t = Severity::Normal)]
    pub severity: Severity,

    /// Type of the entry.
    #[arg(short = 't', long = "type", value_enum, default_value_t = Kind::Info)]
    pub kind: Kind,

    /// Also print the entry to the terminal.
    #[arg(long)]
    pub echo: bool,

    /// File sink settings.
    #[command(flatten)]
    pub sink: SinkArgs,
}

/// File sink settings shared by subcommands.
///
/// Flags override values read from `--config`.
#[derive(Args, Debug, Clone, Default)]
pub struct SinkArgs {
    /// JSON file with a file sink configuration.
    #[arg(short, long, env = "CLAWLOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the log files.
    #[arg(short, long)]
    pub location: Option<PathBuf>,

    /// File name template.
    #[arg(long)]
    pub name_format: Option<String>,

    /// Fail instead of creating a missing directory.
    #[arg(long)]
    pub no_create_dir: bool,

    /// Enable deletion of old log files.
    #[arg(long)]
    pub auto_delete: bool,

    /// Maximum number of log files kept.
    #[arg(long)]
    pub max_log_count: Option<usize>,

    /// Maximum age of a log file in days.
    #[arg(long)]
    pub max_log_age_days: Option<u64>,

    /// Size in bytes at which a new file is started.
    #[arg(long)]
    pub max_log_file_size: Option<u64>,
}

impl SinkArgs {
    /// Builds the file sink configuration from the config file and flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or a value is invalid.
    pub fn to_config(&self) -> Result<FileSinkConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => FileSinkConfig::from_json_file(path)?,
            None => FileSinkConfig::default(),
        };

        if let Some(location) = &self.location {
            config.location.clone_from(location);
        }
        if let Some(name_format) = &self.name_format {
            if name_format.is_empty() {
                return Err(CliError::InvalidArgument(
                    "name format must not be empty".to_string(),
                ));
            }
            config.name_format.clone_from(name_format);
        }
        if self.no_create_dir {
            config.auto_create_directory = false;
        }
        if self.auto_delete {
            config.auto_delete_logs = true;
        }
        if let Some(count) = self.max_log_count {
            config.max_log_count = count;
        }
        if let Some(days) = self.max_log_age_days {
            config.max_log_age = Duration::from_secs(days.saturating_mul(SECONDS_PER_DAY));
        }
        if let Some(size) = self.max_log_file_size {
            config.max_log_file_size = size;
        }
        Ok(config)
    }
}

/// Severity accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Severity {
    /// Chatty detail.
    Verbose,
    /// Regular message.
    Normal,
    /// Deserves attention.
    Important,
    /// Badly broken.
    Critical,
}

impl From<Severity> for LogSeverity {
    fn from(value: Severity) -> Self {
        match value {
            Severity::Verbose => Self::Verbose,
            Severity::Normal => Self::Normal,
            Severity::Important => Self::Important,
            Severity::Critical => Self::Critical,
        }
    }
}

/// Entry type accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    /// Informational.
    Info,
    /// Warning.
    Warning,
    /// Error.
    Error,
}

impl From<Kind> for LogType {
    fn from(value: Kind) -> Self {
        match value {
            Kind::Info => Self::Info,
            Kind::Warning => Self::Warning,
            Kind::Error => Self::Error,
        }
    }
}
