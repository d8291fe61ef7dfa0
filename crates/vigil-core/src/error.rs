//! Core error types for vigil-core.

use std::path::PathBuf;
use thiserror::Error;

/// Umbrella error type for vigil-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Engine command failures.
///
/// Most engine preconditions are tolerated as no-ops (a tick can land right
/// after a stop); only commands with a meaningful failure mode return these.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EngineError {
    #[error("cannot change durations while a session is running")]
    SessionRunning,

    #[error("invalid value for '{field}': must be positive")]
    InvalidDuration { field: &'static str },
}

/// History persistence errors.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("failed to read history at {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write history at {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed history file at {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to export CSV to {path}: {source}")]
    ExportFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Result type alias for CoreError.
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
