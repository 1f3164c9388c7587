//! Core error types for focusclock-core.
//!
//! The timer engine itself never fails; these errors cover the edges around
//! it: loading and editing the persisted timer list, and wake-lock backends.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focusclock-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// No timer with the given id
    #[error("Unknown timer: {0}")]
    UnknownTimer(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Could not resolve the configuration directory
    #[error("Cannot determine configuration directory: {0}")]
    NoDataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    /// Two entries share one id
    #[error("Duplicate id '{id}' in {collection}")]
    DuplicateId { collection: String, id: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Wake-lock backend errors.
///
/// An unsupported environment is not an error; backends report that through
/// `is_supported()` instead.
#[derive(Error, Debug)]
pub enum WakeLockError {
    /// The environment refused the request
    #[error("Wake lock request rejected: {0}")]
    Rejected(String),

    /// The backend helper could not be spawned
    #[error("Failed to spawn wake lock helper '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
