use lyra_core::LyraError;
use thiserror::Error;

/// Errors surfaced by the session stores
#[derive(Error, Debug)]
pub enum SessionError {
    /// The auth provider rejected the request; `code` is the provider's code
    #[error("Authentication failed: {code}")]
    Auth { code: String },

    #[error("No user is signed in")]
    NotAuthenticated,

    #[error("Backend error: {0}")]
    Backend(LyraError),

    #[error("Preferences error: {0}")]
    Preferences(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// Provider error code, for auth failures
    pub fn code(&self) -> Option<&str> {
        match self {
            SessionError::Auth { code } => Some(code),
            _ => None,
        }
    }
}

impl From<LyraError> for SessionError {
    fn from(err: LyraError) -> Self {
        match err {
            LyraError::Auth { code } => SessionError::Auth { code },
            LyraError::NotAuthenticated => SessionError::NotAuthenticated,
            other => SessionError::Backend(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_code_survives_conversion() {
        let err = SessionError::from(LyraError::auth("auth/wrong-password"));
        assert_eq!(err.code(), Some("auth/wrong-password"));

        let err = SessionError::from(LyraError::unavailable("offline"));
        assert!(err.code().is_none());
        assert!(matches!(err, SessionError::Backend(_)));
    }
}
