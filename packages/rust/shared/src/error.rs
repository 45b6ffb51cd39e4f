//! Error types for readlater.
//!
//! Library crates use [`ReadLaterError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

use serde::Serialize;

/// Top-level error type for all readlater operations.
#[derive(Debug, thiserror::Error)]
pub enum ReadLaterError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error outside the fetch path (e.g. building a client).
    #[error("network error: {0}")]
    Network(String),

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Model-backed classification error (API, or response parsing).
    #[error("classification error: {0}")]
    Classification(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad input, invalid format, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ReadLaterError>;

/// Coarse error class handed to the transport shell for error-code mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The caller sent something the service cannot act on.
    MalformedInput,
    /// Something inside the service failed (store unavailable, corruption).
    InternalFailure,
}

impl ReadLaterError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Map this error onto the category the shell reports to its caller.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::MalformedInput,
            Self::Config { .. }
            | Self::Network(_)
            | Self::Storage(_)
            | Self::Classification(_)
            | Self::Io { .. } => ErrorCategory::InternalFailure,
        }
    }
}
