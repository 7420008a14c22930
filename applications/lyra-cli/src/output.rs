//! Simulated audio output
//!
//! Stands in for a real device: it accepts `memory://` URLs and advances its
//! clock only when told to.

use async_trait::async_trait;
use lyra_core::{AudioOutput, LyraError, Result};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug, Default)]
struct Deck {
    url: Option<String>,
    paused: bool,
    position: f64,
    duration: f64,
    volume: f32,
}

pub struct SimulatedOutput {
    deck: Mutex<Deck>,
    /// Fixed length given to every started track
    track_length: f64,
    /// Reject URLs outside the `memory://` scheme
    strict: bool,
}

impl SimulatedOutput {
    pub fn new(track_length: f64) -> Self {
        Self {
            deck: Mutex::new(Deck::default()),
            track_length,
            strict: true,
        }
    }

    /// Accept any URL
    pub fn lenient(mut self) -> Self {
        self.strict = false;
        self
    }

    pub fn current_url(&self) -> Option<String> {
        self.deck().url.clone()
    }

    pub fn volume(&self) -> f32 {
        self.deck().volume
    }

    pub fn is_paused(&self) -> bool {
        self.deck().paused
    }

    /// Move the clock forward; returns true once the track has ended
    pub fn advance(&self, seconds: f64) -> bool {
        let mut deck = self.deck();
        if deck.url.is_none() || deck.paused {
            return false;
        }
        deck.position = (deck.position + seconds).min(deck.duration);
        deck.position >= deck.duration
    }

    fn deck(&self) -> MutexGuard<'_, Deck> {
        self.deck.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl AudioOutput for SimulatedOutput {
    async fn start(&self, url: &str) -> Result<()> {
        if self.strict && !url.starts_with(lyra_storage::BLOB_SCHEME) {
            return Err(LyraError::audio(format!("cannot open {url}")));
        }
        let mut deck = self.deck();
        deck.url = Some(url.to_string());
        deck.paused = false;
        deck.position = 0.0;
        deck.duration = self.track_length;
        debug!(url, "Output started");
        Ok(())
    }

    fn pause(&self) {
        self.deck().paused = true;
    }

    async fn resume(&self) -> Result<()> {
        self.deck().paused = false;
        Ok(())
    }

    fn seek(&self, seconds: f64) {
        let mut deck = self.deck();
        deck.position = seconds.clamp(0.0, deck.duration);
    }

    fn set_volume(&self, volume: f32) {
        self.deck().volume = volume.clamp(0.0, 1.0);
    }

    fn position(&self) -> f64 {
        self.deck().position
    }

    fn duration(&self) -> f64 {
        self.deck().duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clock_stops_at_track_end() {
        let output = SimulatedOutput::new(10.0);
        output.start("memory://tracks/a").await.unwrap();

        assert!(!output.advance(4.0));
        output.seek(8.0);
        assert!(output.advance(5.0));
        assert_eq!(output.position(), 10.0);
    }

    #[tokio::test]
    async fn paused_output_does_not_advance() {
        let output = SimulatedOutput::new(10.0);
        output.start("memory://tracks/a").await.unwrap();
        output.pause();

        assert!(!output.advance(20.0));
        assert_eq!(output.position(), 0.0);
    }

    #[tokio::test]
    async fn strict_output_rejects_foreign_urls() {
        let output = SimulatedOutput::new(10.0);
        assert!(output.start("https://example.com/a.mp3").await.is_err());
        assert!(SimulatedOutput::new(10.0)
            .lenient()
            .start("https://example.com/a.mp3")
            .await
            .is_ok());
    }
}
