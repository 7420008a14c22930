//! End-to-end tests for PlaybackEngine
//!
//! Covers the queue/loop behavior, failure handling, volume, and the
//! last-call-wins resolution of overlapping play requests.

use async_trait::async_trait;
use lyra_core::{AudioOutput, LyraError, Track, TrackId, TrackLoader};
use lyra_playback::{
    LoopMode, PlaybackConfig, PlaybackEngine, PlaybackError, PlaybackEvent, PlaybackState,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Test Infrastructure
// ============================================================================

/// Track lookup with per-track delays and failures
#[derive(Default)]
struct MockLoader {
    delays: Mutex<HashMap<String, Duration>>,
    missing: Mutex<HashSet<String>>,
}

impl MockLoader {
    fn with_delay(self, id: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(id.to_string(), delay);
        self
    }

    fn with_missing(self, id: &str) -> Self {
        self.missing.lock().unwrap().insert(id.to_string());
        self
    }
}

#[async_trait]
impl TrackLoader for MockLoader {
    async fn load_track(&self, id: &TrackId) -> lyra_core::Result<Track> {
        let delay = self.delays.lock().unwrap().get(id.as_str()).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.missing.lock().unwrap().contains(id.as_str()) {
            return Err(LyraError::not_found("track", id.as_str()));
        }
        Ok(serde_json::from_value(serde_json::json!({
            "id": id.as_str(),
            "title": format!("Track {id}"),
            "audioURL": format!("memory://{id}"),
            "duration": 180.0,
        }))
        .unwrap())
    }
}

/// Audio output that records what it was asked to do
#[derive(Default)]
struct RecordingOutput {
    started: Mutex<Vec<String>>,
    volume: Mutex<f32>,
    paused: Mutex<bool>,
    seeks: Mutex<Vec<f64>>,
    broken_urls: Mutex<HashSet<String>>,
}

impl RecordingOutput {
    fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    fn volume(&self) -> f32 {
        *self.volume.lock().unwrap()
    }
}

#[async_trait]
impl AudioOutput for RecordingOutput {
    async fn start(&self, url: &str) -> lyra_core::Result<()> {
        if self.broken_urls.lock().unwrap().contains(url) {
            return Err(LyraError::audio(format!("cannot decode {url}")));
        }
        self.started.lock().unwrap().push(url.to_string());
        *self.paused.lock().unwrap() = false;
        Ok(())
    }

    fn pause(&self) {
        *self.paused.lock().unwrap() = true;
    }

    async fn resume(&self) -> lyra_core::Result<()> {
        *self.paused.lock().unwrap() = false;
        Ok(())
    }

    fn seek(&self, seconds: f64) {
        self.seeks.lock().unwrap().push(seconds);
    }

    fn set_volume(&self, volume: f32) {
        *self.volume.lock().unwrap() = volume;
    }

    fn position(&self) -> f64 {
        0.0
    }

    fn duration(&self) -> f64 {
        180.0
    }
}

fn ids(names: &[&str]) -> Vec<TrackId> {
    names.iter().map(|n| TrackId::new(*n)).collect()
}

fn engine_with(loader: MockLoader) -> (Arc<PlaybackEngine>, Arc<RecordingOutput>) {
    let output = Arc::new(RecordingOutput::default());
    let engine = PlaybackEngine::new(PlaybackConfig::default(), Arc::new(loader), output.clone());
    (Arc::new(engine), output)
}

fn engine() -> (Arc<PlaybackEngine>, Arc<RecordingOutput>) {
    engine_with(MockLoader::default())
}

// ============================================================================
// Queue and navigation
// ============================================================================

#[tokio::test]
async fn play_queue_starts_at_requested_track() {
    let (engine, output) = engine();

    engine
        .play_queue(ids(&["t1", "t2", "t3"]), Some(&TrackId::new("t2")))
        .await
        .unwrap();

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.cursor, Some(TrackId::new("t2")));
    assert_eq!(snapshot.state, PlaybackState::Playing);
    assert!(snapshot.is_player_open);
    assert!(!snapshot.is_loading);
    assert_eq!(output.started(), vec!["memory://t2"]);
}

#[tokio::test]
async fn load_queue_sets_cursor_without_playing() {
    let (engine, output) = engine();

    assert!(engine.load_queue(ids(&["t1", "t2", "t3"]), Some(&TrackId::new("t9"))));

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.queue, ids(&["t1", "t2", "t3"]));
    assert_eq!(snapshot.cursor, Some(TrackId::new("t1")));
    assert!(!snapshot.loaded);
    assert!(output.started().is_empty());
}

#[tokio::test]
async fn loaded_queue_plays_through_to_the_end() {
    let (engine, output) = engine();
    engine.load_queue(ids(&["t1", "t2", "t3"]), None);

    engine.play_track(TrackId::new("t2")).await.unwrap();
    assert_eq!(engine.snapshot().cursor, Some(TrackId::new("t2")));

    engine.next().await.unwrap();
    assert_eq!(engine.snapshot().cursor, Some(TrackId::new("t3")));

    engine.next().await.unwrap();
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.cursor, Some(TrackId::new("t3")));
    assert_eq!(snapshot.queue, ids(&["t1", "t2", "t3"]));
    assert_eq!(output.started(), vec!["memory://t2", "memory://t3"]);
}

#[tokio::test]
async fn loading_empty_queue_keeps_queue_and_cursor() {
    let (engine, _) = engine();
    engine.load_queue(ids(&["t1", "t2", "t3"]), Some(&TrackId::new("t2")));

    assert!(!engine.load_queue(Vec::new(), None));

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.queue, ids(&["t1", "t2", "t3"]));
    assert_eq!(snapshot.cursor, Some(TrackId::new("t2")));
}

#[tokio::test]
async fn next_at_end_without_loop_is_noop() {
    let (engine, output) = engine();
    engine
        .play_queue(ids(&["t1", "t2"]), Some(&TrackId::new("t2")))
        .await
        .unwrap();

    engine.next().await.unwrap();

    assert_eq!(engine.snapshot().cursor, Some(TrackId::new("t2")));
    assert_eq!(output.started().len(), 1);
}

#[tokio::test]
async fn loop_all_wraps_in_both_directions() {
    let (engine, _output) = engine();
    assert_eq!(engine.toggle_loop_mode(), LoopMode::LoopAll);
    engine
        .play_queue(ids(&["t1", "t2", "t3"]), Some(&TrackId::new("t3")))
        .await
        .unwrap();

    engine.next().await.unwrap();
    assert_eq!(engine.snapshot().cursor, Some(TrackId::new("t1")));

    engine.previous().await.unwrap();
    assert_eq!(engine.snapshot().cursor, Some(TrackId::new("t3")));
}

#[tokio::test]
async fn loop_one_replays_current_track() {
    let (engine, output) = engine();
    engine.toggle_loop_mode();
    assert_eq!(engine.toggle_loop_mode(), LoopMode::LoopOne);
    engine.play_queue(ids(&["t1", "t2"]), None).await.unwrap();

    engine.next().await.unwrap();
    engine.previous().await.unwrap();

    assert_eq!(engine.snapshot().cursor, Some(TrackId::new("t1")));
    assert_eq!(output.started(), vec!["memory://t1"; 3]);
}

#[tokio::test]
async fn previous_at_start_without_loop_is_noop() {
    let (engine, output) = engine();
    engine.play_queue(ids(&["t1", "t2"]), None).await.unwrap();

    engine.previous().await.unwrap();

    assert_eq!(engine.snapshot().cursor, Some(TrackId::new("t1")));
    assert_eq!(output.started().len(), 1);
}

#[tokio::test]
async fn track_ended_advances_like_next() {
    let (engine, output) = engine();
    let mut events = engine.subscribe_events();
    engine.play_queue(ids(&["t1", "t2"]), None).await.unwrap();

    engine.handle_track_ended().await.unwrap();

    assert_eq!(engine.snapshot().cursor, Some(TrackId::new("t2")));
    assert_eq!(output.started(), vec!["memory://t1", "memory://t2"]);

    let mut finished = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let PlaybackEvent::TrackFinished { track_id } = event {
            finished.push(track_id);
        }
    }
    assert_eq!(finished, vec!["t1".to_string()]);
}

#[tokio::test]
async fn playing_unqueued_track_replaces_queue() {
    let (engine, _output) = engine();
    engine.play_queue(ids(&["t1", "t2"]), None).await.unwrap();

    engine.play_track(TrackId::new("x9")).await.unwrap();

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.queue, ids(&["x9"]));
    assert!(snapshot.is_first && snapshot.is_last);
}

#[tokio::test]
async fn empty_queue_is_ignored() {
    let (engine, output) = engine();
    engine.play_queue(ids(&["t1", "t2"]), None).await.unwrap();

    engine.play_queue(vec![], None).await.unwrap();

    assert_eq!(engine.snapshot().queue, ids(&["t1", "t2"]));
    assert_eq!(output.started().len(), 1);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn lookup_failure_pauses_and_keeps_cursor() {
    let (engine, output) = engine_with(MockLoader::default().with_missing("t2"));
    let mut events = engine.subscribe_events();
    engine.play_queue(ids(&["t1", "t2"]), None).await.unwrap();

    let err = engine.next().await.unwrap_err();
    assert!(matches!(err, PlaybackError::Lookup { ref track_id, .. } if track_id == "t2"));
    assert!(err.pauses_playback());

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.cursor, Some(TrackId::new("t1")));
    assert!(snapshot.paused);
    assert!(!snapshot.is_loading);
    assert_eq!(output.started(), vec!["memory://t1"]);

    let mut saw_error = false;
    while let Ok(event) = events.try_recv() {
        if matches!(event, PlaybackEvent::Error { ref track_id, .. } if track_id == "t2") {
            saw_error = true;
        }
    }
    assert!(saw_error);
}

#[tokio::test]
async fn audio_failure_pauses() {
    let (engine, output) = engine();
    output
        .broken_urls
        .lock()
        .unwrap()
        .insert("memory://t1".to_string());

    let err = engine
        .play_queue(ids(&["t1", "t2"]), None)
        .await
        .unwrap_err();

    assert!(matches!(err, PlaybackError::AudioOutput { .. }));
    let snapshot = engine.snapshot();
    assert!(snapshot.paused);
    assert!(!snapshot.loaded);
    // The queue was loaded before the play attempt
    assert_eq!(snapshot.cursor, Some(TrackId::new("t1")));
}

#[tokio::test]
async fn pause_resume_and_seek_need_a_loaded_track() {
    let (engine, output) = engine();
    engine.pause();
    engine.resume().await.unwrap();
    engine.seek(30.0);
    assert_eq!(engine.snapshot().state, PlaybackState::Stopped);
    assert!(output.seeks.lock().unwrap().is_empty());

    engine.play_queue(ids(&["t1"]), None).await.unwrap();
    engine.pause();
    assert!(*output.paused.lock().unwrap());
    assert_eq!(engine.snapshot().state, PlaybackState::Paused);

    engine.resume().await.unwrap();
    assert_eq!(engine.snapshot().state, PlaybackState::Playing);

    engine.seek(30.0);
    assert_eq!(*output.seeks.lock().unwrap(), vec![30.0]);
}

// ============================================================================
// Volume
// ============================================================================

#[tokio::test]
async fn mute_restores_previous_volume() {
    let (engine, output) = engine();
    assert!((output.volume() - 0.5).abs() < f32::EPSILON);

    engine.set_volume(0.8);
    engine.toggle_mute();
    assert_eq!(output.volume(), 0.0);
    assert!(engine.snapshot().muted);

    engine.toggle_mute();
    assert!((output.volume() - 0.8).abs() < f32::EPSILON);
    assert!(!engine.snapshot().muted);
}

#[tokio::test]
async fn set_volume_clamps_and_unmutes() {
    let (engine, output) = engine();
    engine.toggle_mute();

    engine.set_volume(1.7);

    assert!((output.volume() - 1.0).abs() < f32::EPSILON);
    assert!(!engine.snapshot().muted);
}

// ============================================================================
// Overlapping play requests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn later_play_request_wins_when_earlier_lookup_finishes_last() {
    let loader = MockLoader::default()
        .with_delay("slow", Duration::from_millis(100))
        .with_delay("fast", Duration::from_millis(10));
    let (engine, output) = engine_with(loader);

    let (slow, fast) = tokio::join!(engine.play_track(TrackId::new("slow")), async {
        tokio::time::sleep(Duration::from_millis(1)).await;
        engine.play_track(TrackId::new("fast")).await
    });

    assert!(matches!(slow, Err(PlaybackError::Superseded { .. })));
    assert!(fast.is_ok());

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.cursor, Some(TrackId::new("fast")));
    assert_eq!(snapshot.state, PlaybackState::Playing);
    assert_eq!(output.started(), vec!["memory://fast"]);
}

#[tokio::test(start_paused = true)]
async fn superseded_failure_does_not_pause() {
    let loader = MockLoader::default()
        .with_delay("gone", Duration::from_millis(100))
        .with_missing("gone");
    let (engine, _output) = engine_with(loader);

    let (gone, ok) = tokio::join!(engine.play_track(TrackId::new("gone")), async {
        tokio::time::sleep(Duration::from_millis(1)).await;
        engine.play_track(TrackId::new("t1")).await
    });

    assert!(matches!(gone, Err(PlaybackError::Superseded { .. })));
    assert!(ok.is_ok());
    assert!(!engine.snapshot().paused);
}

#[tokio::test]
async fn watchers_see_state_changes() {
    let (engine, _output) = engine();
    let mut watch = engine.watch();
    let _ = watch.borrow_and_update();

    engine.play_queue(ids(&["t1"]), None).await.unwrap();

    assert!(watch.has_changed().unwrap());
    let snapshot = watch.borrow_and_update().clone();
    assert_eq!(snapshot.current_track.map(|t| t.id), Some(TrackId::new("t1")));
}
