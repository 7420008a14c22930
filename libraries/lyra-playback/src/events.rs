//! Playback Events
//!
//! Event-based communication for UI synchronization during playback.
//! Events are emitted at key points:
//! - State changes (play/pause)
//! - Track changes (after the new track started)
//! - Volume, loop mode and queue changes
//! - Failures while loading or starting a track

use crate::types::{LoopMode, PlaybackState};
use serde::{Deserialize, Serialize};

/// Events emitted by the playback system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Playback state changed (playing, paused, stopped)
    StateChanged {
        /// The new playback state
        state: PlaybackState,
    },

    /// A new track started
    TrackChanged {
        /// ID of the new (current) track
        track_id: String,
        /// ID of the previous track (if any)
        previous_track_id: Option<String>,
    },

    /// Track finished playing naturally (reached end)
    TrackFinished {
        /// ID of the finished track
        track_id: String,
    },

    /// Volume changed
    VolumeChanged {
        /// New volume level (0.0-1.0)
        level: f32,
        /// Whether audio is muted
        is_muted: bool,
    },

    /// Loop mode toggled
    LoopModeChanged { mode: LoopMode },

    /// Queue replaced
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// Loading or starting a track failed; the engine is paused
    Error {
        /// Track that failed
        track_id: String,
        /// Error message
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_variant_tag() {
        let event = PlaybackEvent::LoopModeChanged {
            mode: LoopMode::LoopAll,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"LoopModeChanged": {"mode": "loop_all"}})
        );
    }
}
