//! Track queue with a cursor
//!
//! The queue is an ordered list of track ids replaced as a whole when a new
//! playback context begins. The cursor is always an element of the queue.

use crate::types::LoopMode;
use lyra_core::types::TrackId;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Queue {
    tracks: Vec<TrackId>,
    cursor: Option<usize>,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue; the cursor moves to `start` when present, else to the
    /// first track
    ///
    /// Returns `false` (and changes nothing) for an empty sequence.
    pub fn replace(&mut self, tracks: Vec<TrackId>, start: Option<&TrackId>) -> bool {
        if tracks.is_empty() {
            return false;
        }
        let cursor = start
            .and_then(|id| tracks.iter().position(|t| t == id))
            .unwrap_or(0);
        self.tracks = tracks;
        self.cursor = Some(cursor);
        true
    }

    /// Move the cursor onto `id`; returns `false` if it is not queued
    pub fn set_cursor(&mut self, id: &TrackId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.cursor = Some(index);
                true
            }
            None => false,
        }
    }

    pub fn position(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t == id)
    }

    pub fn contains(&self, id: &TrackId) -> bool {
        self.position(id).is_some()
    }

    pub fn current(&self) -> Option<&TrackId> {
        self.cursor.and_then(|i| self.tracks.get(i))
    }

    pub fn cursor_index(&self) -> Option<usize> {
        self.cursor
    }

    /// Track `next()` should play under `mode`
    pub fn next_target(&self, mode: LoopMode) -> Option<&TrackId> {
        let index = mode.next_index(self.cursor?, self.tracks.len())?;
        self.tracks.get(index)
    }

    /// Track `previous()` should play under `mode`
    pub fn previous_target(&self, mode: LoopMode) -> Option<&TrackId> {
        let index = mode.previous_index(self.cursor?, self.tracks.len())?;
        self.tracks.get(index)
    }

    pub fn is_first(&self) -> bool {
        self.cursor == Some(0)
    }

    pub fn is_last(&self) -> bool {
        matches!(self.cursor, Some(i) if i + 1 == self.tracks.len())
    }

    pub fn tracks(&self) -> &[TrackId] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
