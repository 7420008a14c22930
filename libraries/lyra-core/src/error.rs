/// Core error types for Lyra
use thiserror::Error;

use crate::types::DocRef;

/// Result type alias using `LyraError`
pub type Result<T> = std::result::Result<T, LyraError>;

/// Core error type for Lyra
///
/// Mirrors the error taxonomy of the data layer: not-found is reported only where
/// a caller explicitly asked for one document, transient backend failures are
/// `Backend`/`Unavailable`, and authentication failures carry the provider code.
#[derive(Error, Debug)]
pub enum LyraError {
    /// Backend call failed (network, quota, permission on the backend side)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Backend is temporarily unreachable
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Referenced document does not exist
    #[error("Document not found: {0}")]
    DocumentNotFound(DocRef),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Authentication provider rejected the request
    #[error("Authentication failed: {code}")]
    Auth { code: String },

    /// Operation requires a signed-in user
    #[error("User not authenticated")]
    NotAuthenticated,

    /// Permission denied with context
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Document shape did not match the expected entity
    #[error("Malformed document {doc}: {reason}")]
    Malformed { doc: String, reason: String },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Audio output failed to load or start
    #[error("Audio error: {0}")]
    Audio(String),

    /// Blob upload failed
    #[error("Upload error: {0}")]
    Upload(String),

    /// Standing query was torn down
    #[error("Subscription closed")]
    SubscriptionClosed,

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl LyraError {
    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create an auth error from a provider error code
    pub fn auth(code: impl Into<String>) -> Self {
        Self::Auth { code: code.into() }
    }

    /// Create a malformed document error
    pub fn malformed(doc: impl ToString, reason: impl Into<String>) -> Self {
        Self::Malformed {
            doc: doc.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an audio error
    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether the error is transient (the user may retry the action)
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Backend(_) | Self::Unavailable(_))
    }
}
