//! Common error types for pinstore.

use thiserror::Error;

/// Top-level error type for pinstore operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure (connect, timeout, body read).
    #[error("Network error: {0}")]
    Network(String),

    /// Pinning service answered with a non-success status.
    #[error("Provider '{provider}' returned {status}: {body}")]
    Provider {
        provider: String,
        status: u16,
        body: String,
    },

    /// Pinning service response lacked its identifier field.
    #[error("Provider '{provider}' response is missing '{field}'")]
    MissingIdentifier {
        provider: String,
        field: &'static str,
    },

    /// Credentials were rejected.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Operation not permitted by the remote service.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
