//! Error types for playback management

use lyra_core::LyraError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Track data could not be fetched
    #[error("Track lookup failed for {track_id}: {source}")]
    Lookup {
        track_id: String,
        #[source]
        source: LyraError,
    },

    /// Audio output refused to load or start the track
    #[error("Audio output error for {track_id}: {source}")]
    AudioOutput {
        track_id: String,
        #[source]
        source: LyraError,
    },

    /// A later `play_track` call took over before this one finished
    #[error("Superseded by a newer play request: {track_id}")]
    Superseded { track_id: String },
}

impl PlaybackError {
    /// Whether the failure left the engine paused
    pub fn pauses_playback(&self) -> bool {
        matches!(self, Self::Lookup { .. } | Self::AudioOutput { .. })
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
