//! Playback engine
//!
//! Combines [`PlaybackManager`] with a [`TrackLoader`] and an [`AudioOutput`].
//! The manager lives behind a mutex that is never held across an await;
//! track lookups and audio starts happen outside it.

use lyra_core::traits::{AudioOutput, TrackLoader};
use lyra_core::types::TrackId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{broadcast, watch};

use crate::error::{PlaybackError, Result};
use crate::events::PlaybackEvent;
use crate::manager::PlaybackManager;
use crate::types::{LoopMode, PlaybackConfig, PlayerSnapshot};

/// Async driver for the queue state machine
///
/// Overlapping [`play_track`](Self::play_track) calls resolve as last call
/// wins: every call takes a generation number, and a call whose lookup
/// completes after a newer call started is discarded without touching the
/// cursor, the audio output or the pause flag.
pub struct PlaybackEngine {
    /// Queue state (shared with snapshot readers)
    manager: Arc<Mutex<PlaybackManager>>,

    loader: Arc<dyn TrackLoader>,

    /// Audio output, owned exclusively by the engine
    output: Arc<dyn AudioOutput>,

    /// Generation of the newest `play_track` call
    generation: AtomicU64,

    /// Serializes audio starts so a stale start cannot land after a newer one
    audio_gate: tokio::sync::Mutex<()>,

    events: broadcast::Sender<PlaybackEvent>,
    snapshot: watch::Sender<PlayerSnapshot>,
}

impl PlaybackEngine {
    /// Create new playback engine
    pub fn new(
        config: PlaybackConfig,
        loader: Arc<dyn TrackLoader>,
        output: Arc<dyn AudioOutput>,
    ) -> Self {
        let manager = PlaybackManager::new(&config);
        output.set_volume(manager.gain());

        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let (snapshot, _) = watch::channel(manager.snapshot());

        Self {
            manager: Arc::new(Mutex::new(manager)),
            loader,
            output,
            generation: AtomicU64::new(0),
            audio_gate: tokio::sync::Mutex::new(()),
            events,
            snapshot,
        }
    }

    // ===== Queue =====

    /// Replace the queue; the cursor moves to `start` when present, else to the
    /// first track. An empty list leaves queue and cursor unchanged.
    pub fn load_queue(&self, track_ids: Vec<TrackId>, start: Option<&TrackId>) -> bool {
        let cursor = self.update(|m| m.load_queue(track_ids, start));
        tracing::debug!(cursor = ?cursor, "Queue loaded");
        cursor.is_some()
    }

    /// Load a queue and play from its cursor
    pub async fn play_queue(&self, track_ids: Vec<TrackId>, start: Option<&TrackId>) -> Result<()> {
        match self.update(|m| m.load_queue(track_ids, start)) {
            Some(cursor) => self.play_track(cursor).await,
            None => Ok(()),
        }
    }

    // ===== Playback Control =====

    /// Look up a track and start playing it
    ///
    /// On failure the engine pauses, the cursor stays where it was, and the
    /// error is both returned and published as [`PlaybackEvent::Error`].
    pub async fn play_track(&self, id: TrackId) -> Result<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.update(PlaybackManager::begin_loading);
        tracing::debug!(track = %id, generation, "Loading track");

        let lookup = self.loader.load_track(&id).await;

        let _gate = self.audio_gate.lock().await;
        if self.is_stale(generation) {
            tracing::debug!(track = %id, generation, "Discarding superseded play request");
            return Err(PlaybackError::Superseded {
                track_id: id.to_string(),
            });
        }

        let track = match lookup {
            Ok(track) => track,
            Err(source) => {
                tracing::warn!(track = %id, error = %source, "Track lookup failed");
                self.update(|m| m.track_failed(&id, source.to_string()));
                return Err(PlaybackError::Lookup {
                    track_id: id.to_string(),
                    source,
                });
            }
        };

        if let Err(source) = self.output.start(&track.audio_url).await {
            tracing::warn!(track = %id, error = %source, "Audio output failed to start");
            self.update(|m| m.track_failed(&id, source.to_string()));
            return Err(PlaybackError::AudioOutput {
                track_id: id.to_string(),
                source,
            });
        }

        let gain = self.update(|m| {
            m.track_started(track);
            m.gain()
        });
        self.output.set_volume(gain);
        tracing::info!(track = %id, "Playing");
        Ok(())
    }

    /// Play the next track according to the loop mode; no-op at the end
    pub async fn next(&self) -> Result<()> {
        match self.read(PlaybackManager::next_target) {
            Some(id) => self.play_track(id).await,
            None => {
                tracing::debug!("No next track");
                Ok(())
            }
        }
    }

    /// Play the previous track according to the loop mode; no-op at the start
    pub async fn previous(&self) -> Result<()> {
        match self.read(PlaybackManager::previous_target) {
            Some(id) => self.play_track(id).await,
            None => {
                tracing::debug!("No previous track");
                Ok(())
            }
        }
    }

    /// End-of-track signal from the audio output; runs exactly the `next()` logic
    pub async fn handle_track_ended(&self) -> Result<()> {
        self.update(PlaybackManager::track_finished);
        self.next().await
    }

    /// Pause playback (no-op when no track is loaded)
    pub fn pause(&self) {
        if self.update(PlaybackManager::pause) {
            self.output.pause();
        }
    }

    /// Resume playback (no-op when no track is loaded)
    pub async fn resume(&self) -> Result<()> {
        let resumable = self.read(|m| m.is_loaded() && m.is_paused());
        if !resumable {
            return Ok(());
        }
        let current = self
            .read(|m| m.current_track().map(|t| t.id.clone()))
            .ok_or(PlaybackError::NoTrackLoaded)?;

        if let Err(source) = self.output.resume().await {
            tracing::warn!(track = %current, error = %source, "Audio output failed to resume");
            self.update(|m| m.track_failed(&current, source.to_string()));
            return Err(PlaybackError::AudioOutput {
                track_id: current.to_string(),
                source,
            });
        }
        self.update(PlaybackManager::resume);
        Ok(())
    }

    /// Seek within the current track; clamping is the output's job
    pub fn seek(&self, seconds: f64) {
        if self.read(PlaybackManager::is_loaded) {
            self.output.seek(seconds);
        }
    }

    // ===== Volume =====

    /// Set volume (0.0-1.0); unmutes
    pub fn set_volume(&self, level: f32) {
        let gain = self.update(|m| m.set_volume(level));
        self.output.set_volume(gain);
    }

    /// Mute, or restore the pre-mute volume
    pub fn toggle_mute(&self) {
        let gain = self.update(PlaybackManager::toggle_mute);
        self.output.set_volume(gain);
    }

    // ===== Loop mode =====

    /// Advance `Off → LoopAll → LoopOne → Off`
    pub fn toggle_loop_mode(&self) -> LoopMode {
        self.update(PlaybackManager::toggle_loop_mode)
    }

    // ===== State =====

    /// Current engine state
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Watch the engine state; a new value is published after every change
    pub fn watch(&self) -> watch::Receiver<PlayerSnapshot> {
        self.snapshot.subscribe()
    }

    /// Subscribe to playback events
    pub fn subscribe_events(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    /// Position in the current track, in seconds
    pub fn position(&self) -> f64 {
        self.output.position()
    }

    /// Duration of the current track, in seconds
    pub fn duration(&self) -> f64 {
        self.output.duration()
    }

    /// Whether the current track is among `liked`
    pub fn is_liked(&self, liked: &[TrackId]) -> bool {
        self.read(|m| m.is_liked(liked))
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    fn read<R>(&self, f: impl FnOnce(&PlaybackManager) -> R) -> R {
        let manager = self.manager.lock().unwrap_or_else(PoisonError::into_inner);
        f(&manager)
    }

    /// Mutate the manager, then publish its events and a fresh snapshot
    fn update<R>(&self, f: impl FnOnce(&mut PlaybackManager) -> R) -> R {
        let mut manager = self.manager.lock().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut manager);
        for event in manager.drain_events() {
            // No subscribers is fine
            let _ = self.events.send(event);
        }
        self.snapshot.send_replace(manager.snapshot());
        result
    }
}
