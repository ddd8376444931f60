//! Error types for SiteDoc.
//!
//! Library crates use [`SiteDocError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all SiteDoc operations.
#[derive(Debug, thiserror::Error)]
pub enum SiteDocError {
    /// Configuration or task file loading/validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching a page.
    #[error("network error: {0}")]
    Network(String),

    /// URL or HTML parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (task descriptor without URL, depth 0, ...).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Document rendering or serialization error.
    #[error("render error: {0}")]
    Render(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SiteDocError>;

impl SiteDocError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
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
        let err = SiteDocError::config("tasks file is not a JSON array");
        assert_eq!(err.to_string(), "config error: tasks file is not a JSON array");

        let err = SiteDocError::validation("task 3 has no url");
        assert!(err.to_string().contains("task 3"));

        let err = SiteDocError::Network("https://example.com/: HTTP 404 Not Found".into());
        assert!(err.to_string().starts_with("network error:"));
    }
}
