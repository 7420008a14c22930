/// Client error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend error: {0}")]
    Backend(#[from] lyra_core::LyraError),

    #[error("Playback error: {0}")]
    Playback(#[from] lyra_playback::PlaybackError),

    #[error("Session error: {0}")]
    Session(#[from] lyra_session::SessionError),

    #[error("Timed out waiting for {0}")]
    Timeout(&'static str),
}
