//! Error types for tiercast-core.
//!
//! Storage failures inside the telemetry engine are recovered locally (see
//! `persist`): a failed flush or a malformed artifact never propagates to
//! the prediction-serving path. The variants here cover the places where an
//! error is the caller's business — configuration loading and explicit
//! store writes.

use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tiercast-core.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Persistence errors.
    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config file {0}: {1}")]
    ReadFailed(String, String),

    /// Config file could not be parsed.
    #[error("Failed to parse config: {0}")]
    ParseFailed(String),

    /// A config value is out of range.
    #[error("Validation error: {0}")]
    Validation(String),
}

/// History artifact write errors.
///
/// Load-side problems are deliberately not errors: bad prior state reads as
/// empty history.
#[derive(Error, Debug)]
pub enum PersistError {
    /// Records could not be serialized.
    #[error("Failed to serialize history: {0}")]
    Serialize(String),

    /// The artifact (or its temp file) could not be written.
    #[error("Failed to write {0}: {1}")]
    Write(String, String),
}
