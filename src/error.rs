//! Error types for the masonry flow engine

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring the engine or loading content.
///
/// Per-frame operations (`tick`, card creation, eviction) never fail; they
/// degrade to no-ops instead. Errors only surface at construction and load
/// time.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Content data could not be interpreted
    #[error("Invalid content data: {0}")]
    DataError(String),

    /// Failed to read a data or config file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON input
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
