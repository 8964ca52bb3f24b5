//! Logger error types

use thiserror::Error;

/// Errors that can occur while configuring or initializing the logger.
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Invalid log level '{0}'. Valid levels are: trace, debug, info, warn, error")]
    InvalidLevel(String),

    #[error("Invalid log format '{0}'. Valid formats are: full, compact, json")]
    InvalidFormat(String),

    #[error("At least one output (console or file) must be enabled")]
    NoOutputEnabled,

    #[error("Failed to open log file '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
