//! Error types for Redraft.

use serde::Serialize;
use thiserror::Error;

/// A shared error type for the entire Redraft engine.
///
/// The first five variants form the editing taxonomy surfaced to UIs
/// (validation, conflict, not-found, upstream timeout, upstream failure).
/// The remaining variants cover storage and configuration plumbing.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum RedraftError {
    /// Malformed input, e.g. a suggestion without a new value.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation collides with the current state (double accept, pending proposal, ...).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The text-generation collaborator did not answer in time.
    #[error("Text generation timed out after {timeout_ms} ms")]
    UpstreamTimeout { timeout_ms: u64 },

    /// The text-generation collaborator answered with a failure.
    #[error("Text generation failed: {0}")]
    Upstream(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Data access error (repository/storage layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RedraftError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an Upstream error
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a Conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an upstream timeout
    pub fn is_upstream_timeout(&self) -> bool {
        matches!(self, Self::UpstreamTimeout { .. })
    }

    /// Whether a caller may retry the same request unchanged.
    ///
    /// Only upstream timeouts qualify. Validation and conflict errors need the
    /// caller to change something first; upstream failures are reported as-is.
    pub fn is_retryable(&self) -> bool {
        self.is_upstream_timeout()
    }

    /// Whether the error should be shown inline next to the edited text
    /// rather than as a banner.
    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Conflict(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for RedraftError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for RedraftError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for RedraftError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for RedraftError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for RedraftError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, RedraftError>`.
pub type Result<T> = std::result::Result<T, RedraftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_timeouts_are_retryable() {
        assert!(RedraftError::UpstreamTimeout { timeout_ms: 10 }.is_retryable());
        assert!(!RedraftError::upstream("boom").is_retryable());
        assert!(!RedraftError::conflict("pending").is_retryable());
        assert!(!RedraftError::validation("empty").is_retryable());
    }

    #[test]
    fn test_inline_errors() {
        assert!(RedraftError::validation("missing new value").is_inline());
        assert!(RedraftError::conflict("already accepted").is_inline());
        assert!(!RedraftError::not_found("Session", "s-1").is_inline());
    }

    #[test]
    fn test_not_found_display() {
        let err = RedraftError::not_found("Version", "doc-1@7");
        assert_eq!(err.to_string(), "Entity not found: Version 'doc-1@7'");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_io_conversion_keeps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: RedraftError = io.into();
        match err {
            RedraftError::Io { message } => assert!(message.contains("PermissionDenied")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
