/// Capability traits for Lyra's external collaborators
use crate::error::Result;
use crate::types::{Track, TrackId, UserId};
use async_trait::async_trait;

/// Blob storage for covers, audio files and avatars
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload bytes under `path` and return a durable download URL
    async fn upload_blob(&self, path: &str, bytes: Vec<u8>) -> Result<String>;
}

/// Email/password authentication provider
///
/// Failures are reported as [`LyraError::Auth`](crate::LyraError::Auth) carrying
/// the provider's error code (`auth/email-already-in-use`, ...).
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an account and sign it in
    async fn sign_up(&self, email: &str, password: &str) -> Result<UserId>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserId>;

    async fn sign_out(&self) -> Result<()>;

    /// The signed-in user, if any
    async fn current_user(&self) -> Result<Option<UserId>>;
}

/// Audio output driven by the playback engine
///
/// The engine owns the handle exclusively. Range clamping for `seek` and
/// `set_volume` is the output's job. The host reports the end of a track by
/// calling the engine's `handle_track_ended`.
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Load the audio behind `url` and start playing it from the beginning
    async fn start(&self, url: &str) -> Result<()>;

    fn pause(&self);

    async fn resume(&self) -> Result<()>;

    /// Jump to `seconds` from the start of the current track
    fn seek(&self, seconds: f64);

    /// Output gain in `0.0..=1.0`
    fn set_volume(&self, volume: f32);

    /// Current position in seconds
    fn position(&self) -> f64;

    /// Duration of the loaded track in seconds (0 when unknown)
    fn duration(&self) -> f64;
}

/// Track lookup used by the playback engine before starting audio
#[async_trait]
pub trait TrackLoader: Send + Sync {
    /// Fetch a track with its author and album resolved
    async fn load_track(&self, id: &TrackId) -> Result<Track>;
}
