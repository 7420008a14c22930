//! Core types for playback management

use lyra_core::types::{Track, TrackId};
use serde::{Deserialize, Serialize};

/// Loop mode
///
/// Cycles `Off → LoopAll → LoopOne → Off` on explicit toggle only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    /// Stop at either end of the queue
    #[default]
    Off,

    /// Wrap around the whole queue
    LoopAll,

    /// Repeat the current track
    LoopOne,
}

impl LoopMode {
    /// Next mode in the toggle cycle
    #[must_use]
    pub fn cycle(self) -> Self {
        match self {
            LoopMode::Off => LoopMode::LoopAll,
            LoopMode::LoopAll => LoopMode::LoopOne,
            LoopMode::LoopOne => LoopMode::Off,
        }
    }

    /// Index to play after `index` in a queue of `len` tracks, `None` for no-op
    ///
    /// | mode    | not at end | at end |
    /// |---------|------------|--------|
    /// | Off     | index+1    | none   |
    /// | LoopAll | index+1    | 0      |
    /// | LoopOne | index      | index  |
    pub fn next_index(self, index: usize, len: usize) -> Option<usize> {
        if index >= len {
            return None;
        }
        let at_end = index + 1 == len;
        match self {
            LoopMode::LoopOne => Some(index),
            LoopMode::LoopAll if at_end => Some(0),
            LoopMode::Off if at_end => None,
            LoopMode::Off | LoopMode::LoopAll => Some(index + 1),
        }
    }

    /// Index to play before `index` in a queue of `len` tracks, `None` for no-op
    ///
    /// | mode    | not at start | at start   |
    /// |---------|--------------|------------|
    /// | Off     | index-1      | none       |
    /// | LoopAll | index-1      | last index |
    /// | LoopOne | index        | index      |
    pub fn previous_index(self, index: usize, len: usize) -> Option<usize> {
        if index >= len {
            return None;
        }
        let at_start = index == 0;
        match self {
            LoopMode::LoopOne => Some(index),
            LoopMode::LoopAll if at_start => Some(len - 1),
            LoopMode::Off if at_start => None,
            LoopMode::Off | LoopMode::LoopAll => Some(index - 1),
        }
    }
}

impl std::str::FromStr for LoopMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "off" => Ok(LoopMode::Off),
            "loop_all" | "all" => Ok(LoopMode::LoopAll),
            "loop_one" | "one" => Ok(LoopMode::LoopOne),
            other => Err(format!("unknown loop mode: {other}")),
        }
    }
}

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No track loaded
    Stopped,

    /// Currently playing
    Playing,

    /// Paused mid-track, or a load failed
    Paused,
}

/// Configuration for the playback engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Initial volume (0.0-1.0, default: 0.5)
    pub volume: f32,

    /// Initial loop mode (default: Off)
    pub loop_mode: LoopMode,

    /// Capacity of the event broadcast channel (default: 64)
    pub event_capacity: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: 0.5,
            loop_mode: LoopMode::Off,
            event_capacity: 64,
        }
    }
}

/// Point-in-time view of the player, derived from engine state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub queue: Vec<TrackId>,
    pub cursor: Option<TrackId>,
    pub loop_mode: LoopMode,
    pub state: PlaybackState,
    pub paused: bool,
    /// A track has been loaded into the output at least once
    pub loaded: bool,
    pub volume: f32,
    pub muted: bool,
    pub current_track: Option<Track>,
    pub is_first: bool,
    pub is_last: bool,
    pub is_player_open: bool,
    /// A track lookup is in flight
    pub is_loading: bool,
}

impl PlayerSnapshot {
    /// Index of the cursor within the queue
    pub fn cursor_index(&self) -> Option<usize> {
        let cursor = self.cursor.as_ref()?;
        self.queue.iter().position(|id| id == cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.volume, 0.5);
        assert_eq!(config.loop_mode, LoopMode::Off);
    }

    #[test]
    fn loop_table_off() {
        assert_eq!(LoopMode::Off.next_index(0, 3), Some(1));
        assert_eq!(LoopMode::Off.next_index(2, 3), None);
        assert_eq!(LoopMode::Off.previous_index(2, 3), Some(1));
        assert_eq!(LoopMode::Off.previous_index(0, 3), None);
    }

    #[test]
    fn loop_table_all() {
        assert_eq!(LoopMode::LoopAll.next_index(1, 3), Some(2));
        assert_eq!(LoopMode::LoopAll.next_index(2, 3), Some(0));
        assert_eq!(LoopMode::LoopAll.previous_index(1, 3), Some(0));
        assert_eq!(LoopMode::LoopAll.previous_index(0, 3), Some(2));
    }

    #[test]
    fn loop_table_one() {
        for index in 0..3 {
            assert_eq!(LoopMode::LoopOne.next_index(index, 3), Some(index));
            assert_eq!(LoopMode::LoopOne.previous_index(index, 3), Some(index));
        }
    }

    #[test]
    fn single_track_queue_is_both_ends() {
        assert_eq!(LoopMode::Off.next_index(0, 1), None);
        assert_eq!(LoopMode::Off.previous_index(0, 1), None);
        assert_eq!(LoopMode::LoopAll.next_index(0, 1), Some(0));
        assert_eq!(LoopMode::LoopAll.previous_index(0, 1), Some(0));
    }

    #[test]
    fn cycle_returns_to_off_after_three_toggles() {
        let mode = LoopMode::Off.cycle().cycle().cycle();
        assert_eq!(mode, LoopMode::Off);
        assert_eq!(LoopMode::Off.cycle(), LoopMode::LoopAll);
        assert_eq!(LoopMode::LoopAll.cycle(), LoopMode::LoopOne);
    }

    #[test]
    fn parse_loop_mode() {
        assert_eq!("loop-all".parse::<LoopMode>(), Ok(LoopMode::LoopAll));
        assert_eq!("one".parse::<LoopMode>(), Ok(LoopMode::LoopOne));
        assert!("shuffle".parse::<LoopMode>().is_err());
    }
}
