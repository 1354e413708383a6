//! Error types for the logging facility.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the logging facility.
#[derive(Debug, Error)]
pub enum LogError {
    /// A sink of the same concrete type is already registered.
    #[error(
        "a sink of type {type_name} has already been added; register the instance explicitly if this was intentional"
    )]
    DuplicateSinkType {
        /// Name of the duplicated sink type.
        type_name: &'static str,
    },

    /// Retention was requested on a sink that does not auto-delete logs.
    #[error("auto delete logs is not enabled")]
    RetentionDisabled,

    /// The log directory does not exist and may not be created.
    #[error("log directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type alias for logging operations.
pub type Result<T> = std::result::Result<T, LogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = LogError::DuplicateSinkType {
            type_name: "claw_logs::sink::ConsoleSink",
        };
        assert!(err.to_string().contains("claw_logs::sink::ConsoleSink"));

        let err = LogError::RetentionDisabled;
        assert_eq!(err.to_string(), "auto delete logs is not enabled");

        let err = LogError::DirectoryNotFound(PathBuf::from("/var/log/app"));
        assert_eq!(err.to_string(), "log directory not found: /var/log/app");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LogError>();
    }

    #[test]
    fn error_io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LogError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn error_config_conversion() {
        let json_err = serde_json::from_str::<u32>("not json").expect_err("invalid json");
        let err: LogError = json_err.into();
        assert!(err.to_string().starts_with("invalid configuration"));
    }
}
