//! Common error types for Folio

use thiserror::Error;

/// Common result type for Folio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Folio crates
#[derive(Error, Debug)]
pub enum Error {
    /// Settings database error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON in the content document or a persisted value
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Content fetch over HTTP failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Content source does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Content source that cannot be fetched at all
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
