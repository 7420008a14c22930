//! Playback manager - queue state machine
//!
//! Holds the queue, cursor, loop mode, pause flag and volume, and records
//! events for every change. It performs no I/O: track lookup and audio output
//! belong to [`PlaybackEngine`](crate::PlaybackEngine), which drives it.

use crate::{
    events::PlaybackEvent,
    queue::Queue,
    types::{LoopMode, PlaybackConfig, PlaybackState, PlayerSnapshot},
    volume::Volume,
};
use lyra_core::types::{Track, TrackId};

/// Queue-relative playback state
#[derive(Debug, Clone)]
pub struct PlaybackManager {
    queue: Queue,
    loop_mode: LoopMode,
    volume: Volume,
    paused: bool,

    /// Data of the track the output is playing
    current_track: Option<Track>,

    is_player_open: bool,
    is_loading: bool,

    // Event queue for UI synchronization
    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackManager {
    /// Create new playback manager
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            queue: Queue::new(),
            loop_mode: config.loop_mode,
            volume: Volume::new(config.volume),
            paused: false,
            current_track: None,
            is_player_open: false,
            is_loading: false,
            pending_events: Vec::new(),
        }
    }

    // ===== Queue =====

    /// Replace the queue; empty input is a no-op
    ///
    /// Returns the new cursor, or `None` when nothing changed.
    pub fn load_queue(&mut self, track_ids: Vec<TrackId>, start: Option<&TrackId>) -> Option<TrackId> {
        if !self.queue.replace(track_ids, start) {
            return None;
        }
        self.emit_queue_changed();
        self.queue.current().cloned()
    }

    /// Track `next()` should play, `None` for a no-op
    pub fn next_target(&self) -> Option<TrackId> {
        self.queue.next_target(self.loop_mode).cloned()
    }

    /// Track `previous()` should play, `None` for a no-op
    pub fn previous_target(&self) -> Option<TrackId> {
        self.queue.previous_target(self.loop_mode).cloned()
    }

    pub fn cursor(&self) -> Option<&TrackId> {
        self.queue.current()
    }

    pub fn queue(&self) -> &[TrackId] {
        self.queue.tracks()
    }

    // ===== Track loading =====

    /// A lookup for a new track started
    pub fn begin_loading(&mut self) {
        self.is_loading = true;
    }

    /// The requested track is playing: move the cursor onto it
    ///
    /// A track outside the queue replaces the queue with just that track.
    pub fn track_started(&mut self, track: Track) {
        let previous_track_id = self.current_track.as_ref().map(|t| t.id.to_string());

        if !self.queue.set_cursor(&track.id) {
            self.queue.replace(vec![track.id.clone()], None);
            self.emit_queue_changed();
        }

        let track_id = track.id.to_string();
        self.current_track = Some(track);
        self.is_player_open = true;
        self.is_loading = false;
        self.paused = false;

        self.pending_events.push(PlaybackEvent::TrackChanged {
            track_id,
            previous_track_id,
        });
        self.emit_state_changed();
    }

    /// Loading or starting `track_id` failed; the cursor stays where it was
    pub fn track_failed(&mut self, track_id: &TrackId, message: String) {
        self.is_loading = false;
        self.paused = true;
        self.pending_events.push(PlaybackEvent::Error {
            track_id: track_id.to_string(),
            message,
        });
        self.emit_state_changed();
    }

    /// The output reached the end of the current track
    pub fn track_finished(&mut self) -> Option<TrackId> {
        let id = self.current_track.as_ref()?.id.clone();
        self.pending_events.push(PlaybackEvent::TrackFinished {
            track_id: id.to_string(),
        });
        Some(id)
    }

    // ===== Playback Control =====

    /// Whether a track has been loaded into the output
    pub fn is_loaded(&self) -> bool {
        self.current_track.is_some()
    }

    /// Pause playback; returns `false` when nothing changed
    pub fn pause(&mut self) -> bool {
        if !self.is_loaded() || self.paused {
            return false;
        }
        self.paused = true;
        self.emit_state_changed();
        true
    }

    /// Resume playback; returns `false` when nothing changed
    pub fn resume(&mut self) -> bool {
        if !self.is_loaded() || !self.paused {
            return false;
        }
        self.paused = false;
        self.emit_state_changed();
        true
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn state(&self) -> PlaybackState {
        match (self.is_loaded(), self.paused) {
            (false, false) => PlaybackState::Stopped,
            (_, true) => PlaybackState::Paused,
            (true, false) => PlaybackState::Playing,
        }
    }

    // ===== Volume =====

    /// Set volume (0.0-1.0); unmutes
    pub fn set_volume(&mut self, level: f32) -> f32 {
        self.volume.set_level(level);
        self.emit_volume_changed();
        self.volume.gain()
    }

    /// Toggle mute; returns the gain to apply
    pub fn toggle_mute(&mut self) -> f32 {
        self.volume.toggle_mute();
        self.emit_volume_changed();
        self.volume.gain()
    }

    pub fn gain(&self) -> f32 {
        self.volume.gain()
    }

    // ===== Loop mode =====

    pub fn toggle_loop_mode(&mut self) -> LoopMode {
        self.loop_mode = self.loop_mode.cycle();
        self.pending_events.push(PlaybackEvent::LoopModeChanged {
            mode: self.loop_mode,
        });
        self.loop_mode
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    // ===== Derived state =====

    pub fn current_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    /// Whether the current track is in `liked`
    pub fn is_liked(&self, liked: &[TrackId]) -> bool {
        self.current_track
            .as_ref()
            .is_some_and(|track| liked.contains(&track.id))
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            queue: self.queue.tracks().to_vec(),
            cursor: self.queue.current().cloned(),
            loop_mode: self.loop_mode,
            state: self.state(),
            paused: self.paused,
            loaded: self.is_loaded(),
            volume: self.volume.level(),
            muted: self.volume.is_muted(),
            current_track: self.current_track.clone(),
            is_first: self.is_loaded() && self.queue.is_first(),
            is_last: self.is_loaded() && self.queue.is_last(),
            is_player_open: self.is_player_open,
            is_loading: self.is_loading,
        }
    }

    // ===== Events =====

    /// Drain all pending events
    ///
    /// Returns all events that have been emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    fn emit_state_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::StateChanged {
            state: self.state(),
        });
    }

    fn emit_volume_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::VolumeChanged {
            level: self.volume.level(),
            is_muted: self.volume.is_muted(),
        });
    }

    fn emit_queue_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::QueueChanged {
            length: self.queue.len(),
        });
    }
}

impl Default for PlaybackManager {
    fn default() -> Self {
        Self::new(&PlaybackConfig::default())
    }
}
