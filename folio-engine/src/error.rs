//! Error types for folio-engine
//!
//! Interactive operations never fail; they degrade and log. Errors only
//! come out of the driver surface: reading and parsing a command script.

use thiserror::Error;

/// Main error type for folio-engine
#[derive(Error, Debug)]
pub enum Error {
    /// Script line names no known command
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Command arguments missing or malformed
    #[error("Invalid arguments for '{command}': {message}")]
    InvalidArguments { command: String, message: String },

    /// Script file or stdin could not be read
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for folio-engine
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(command: &str, message: impl Into<String>) -> Self {
        Error::InvalidArguments {
            command: command.to_string(),
            message: message.into(),
        }
    }
}
