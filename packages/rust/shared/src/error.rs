//! Error types for fieldpress.
//!
//! Library crates use [`FieldpressError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all fieldpress operations.
#[derive(Debug, thiserror::Error)]
pub enum FieldpressError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// CRM authentication failure.
    #[error("auth error: {0}")]
    Auth(String),

    /// Network/HTTP error while talking to the CRM.
    #[error("network error: {0}")]
    Network(String),

    /// Snapshot cache error (missing or unreadable in offline mode).
    #[error("cache error: {message}")]
    Cache { message: String },

    /// A raw record is missing a required source field.
    #[error("mapping error: {message}")]
    Mapping { message: String },

    /// Data validation error (unknown record type, bad response shape).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FieldpressError>;

impl FieldpressError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a cache error from any displayable message.
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache {
            message: msg.into(),
        }
    }

    /// Create a mapping error from any displayable message.
    pub fn mapping(msg: impl Into<String>) -> Self {
        Self::Mapping {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = FieldpressError::config("missing CRM credentials");
        assert_eq!(err.to_string(), "config error: missing CRM credentials");

        let err = FieldpressError::mapping("raw record has no key 'Type__c'");
        assert!(err.to_string().contains("Type__c"));
    }
}
