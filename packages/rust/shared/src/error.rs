//! Error types for EventPages.
//!
//! Library crates use [`EventPagesError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all EventPages operations.
///
/// Every variant is terminal for a generation run: the pipeline stops at the
/// first error and does not roll back files already written.
#[derive(Debug, thiserror::Error)]
pub enum EventPagesError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level failure retrieving the feed.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Feed payload could not be parsed as JSON.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Feed payload parsed, but matched none of the accepted top-level shapes.
    #[error("schema error: {message}")]
    Schema { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (unsafe output path, bad serialization, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, EventPagesError>;

impl EventPagesError {
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

    /// Create a schema error from any displayable message.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema {
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
        let err = EventPagesError::config("unknown checkin policy 'someday'");
        assert_eq!(err.to_string(), "config error: unknown checkin policy 'someday'");

        let err = EventPagesError::schema("no features array found");
        assert!(err.to_string().starts_with("schema error:"));

        let err = EventPagesError::Fetch("https://example.com/feed.json: HTTP 503".into());
        assert!(err.to_string().contains("HTTP 503"));
    }

    #[test]
    fn io_error_carries_path() {
        let err = EventPagesError::io(
            "/tmp/events/a.html",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/events/a.html"));
        assert!(msg.contains("denied"));
    }
}
