//! Subcommand implementations
//!
//! Each command returns its report as text so `main` only prints.

use lyra_catalog::{Catalog, ChatView};
use lyra_core::types::{AlbumId, Link, MessageId, Track, TrackId, UserId};
use lyra_playback::{LoopMode, PlaybackEngine, PlaybackEvent};
use lyra_session::{AuthSession, FilePreferences, MessageStore, ThemeStore};
use lyra_storage::MemoryStore;
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

use crate::config::LyraConfig;
use crate::error::{CliError, Result};
use crate::output::SimulatedOutput;

/// Demo data used when no fixture is configured
pub const DEMO_FIXTURE: &str = include_str!("../fixtures/demo.json");

/// Length the simulated output gives every track, in seconds
pub const SIMULATED_TRACK_LENGTH: f64 = 180.0;

const SYNC_TIMEOUT: Duration = Duration::from_secs(5);

/// Arguments of `play`
#[derive(Debug, Clone, Default)]
pub struct PlayRequest {
    pub album: String,
    pub start: Option<String>,
    pub loop_mode: Option<LoopMode>,
    /// How many times to run the current track to its end
    pub advance: usize,
}

/// A message to send from `chats`
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub to: String,
    pub text: String,
}

pub struct App {
    config: LyraConfig,
    store: MemoryStore,
    catalog: Catalog,
}

impl App {
    /// Seed a fresh in-memory backend from the configured fixture
    pub fn new(config: LyraConfig) -> Result<Self> {
        let store = match &config.backend.fixture {
            Some(path) => MemoryStore::from_fixture_file(path)?,
            None => {
                let fixture = serde_json::from_str(DEMO_FIXTURE)
                    .map_err(|e| CliError::Config(format!("bundled fixture: {e}")))?;
                MemoryStore::from_json(fixture)?
            }
        };
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: LyraConfig, store: MemoryStore) -> Self {
        let catalog = Catalog::new(Arc::new(store.clone()), Arc::new(store.clone()));
        Self {
            config,
            store,
            catalog,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // ===== Catalog =====

    pub async fn album(&self, id: &str) -> Result<String> {
        let album = self
            .catalog
            .get_album_by_id(&AlbumId::new(id))
            .await?
            .ok_or_else(|| CliError::NotFound(format!("album {id}")))?;

        let mut out = String::new();
        let _ = writeln!(out, "{}", album.title);
        if let Some(author) = album.author.as_ref().and_then(Link::resolved) {
            let _ = writeln!(
                out,
                "by {} ({} listeners)",
                author.display_name,
                author.listeners_count.unwrap_or(0)
            );
        }
        if !album.description.is_empty() {
            let _ = writeln!(out, "{}", album.description);
        }
        let _ = writeln!(
            out,
            "{} tracks, {}{}",
            album.tracks.len(),
            format_duration(album.duration),
            if album.is_explicit { ", explicit" } else { "" }
        );
        for (index, track) in album.tracks.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>3}. {} [{}]",
                index + 1,
                track.title,
                format_duration(track.duration)
            );
        }
        Ok(out)
    }

    pub async fn artist(&self, id: &str) -> Result<String> {
        let artist = self
            .catalog
            .get_artist_by_id(&UserId::new(id))
            .await?
            .ok_or_else(|| CliError::NotFound(format!("artist {id}")))?;

        let mut out = String::new();
        let _ = writeln!(out, "{}", artist.display_name);
        let _ = writeln!(out, "{} listeners", artist.listeners_count);
        if let Some(description) = &artist.description {
            let _ = writeln!(out, "{description}");
        }
        let _ = writeln!(out, "Albums:");
        for album in &artist.albums {
            let _ = writeln!(out, "  {} ({} tracks)", album.title, album.tracks.len());
        }
        let _ = writeln!(out, "Tracks:");
        for track in &artist.tracks {
            let _ = writeln!(out, "  {}", track.title);
        }
        Ok(out)
    }

    pub async fn reports(&self) -> Result<String> {
        let reports = self.catalog.fetch_reports().await?;

        let mut out = String::new();
        if reports.is_empty() {
            let _ = writeln!(out, "No reports");
        }
        for report in reports {
            let reporter = report
                .reporter_user
                .as_ref()
                .map_or("?", |u| u.display_name.as_str());
            let target = report
                .target_user
                .as_ref()
                .map_or("?", |u| u.display_name.as_str());
            let _ = writeln!(
                out,
                "[{}] {} {}: {} (reported by {}, against {})",
                report.status.as_str(),
                report.kind.as_str(),
                report.id,
                report.reason.as_deref().unwrap_or("-"),
                reporter,
                target
            );
        }
        Ok(out)
    }

    // ===== Playback =====

    /// Queue an album and let the simulated output play through it
    pub async fn play(&self, request: PlayRequest) -> Result<String> {
        let album = self
            .catalog
            .get_album_by_id(&AlbumId::new(request.album.as_str()))
            .await?
            .ok_or_else(|| CliError::NotFound(format!("album {}", request.album)))?;
        let titles: HashMap<TrackId, String> = album
            .tracks
            .iter()
            .map(|t| (t.id.clone(), t.title.clone()))
            .collect();
        let queue: Vec<TrackId> = album.tracks.iter().map(|t| t.id.clone()).collect();

        let mut config = self.config.playback_config();
        if let Some(mode) = request.loop_mode {
            config.loop_mode = mode;
        }
        let output = Arc::new(SimulatedOutput::new(SIMULATED_TRACK_LENGTH));
        let engine = PlaybackEngine::new(config, Arc::new(self.catalog.clone()), output.clone());
        let mut events = engine.subscribe_events();

        let start = request.start.map(TrackId::new);
        engine.play_queue(queue, start.as_ref()).await?;
        for _ in 0..request.advance {
            if output.advance(SIMULATED_TRACK_LENGTH) {
                engine.handle_track_ended().await?;
            }
        }

        let title_of = |id: &str| {
            titles
                .get(&TrackId::new(id))
                .cloned()
                .unwrap_or_else(|| id.to_string())
        };
        let mut out = String::new();
        while let Ok(event) = events.try_recv() {
            match event {
                PlaybackEvent::TrackChanged { track_id, .. } => {
                    let _ = writeln!(out, "> {}", title_of(&track_id));
                }
                PlaybackEvent::TrackFinished { track_id } => {
                    let _ = writeln!(out, "  finished {}", title_of(&track_id));
                }
                PlaybackEvent::Error { track_id, message } => {
                    let _ = writeln!(out, "! {}: {message}", title_of(&track_id));
                }
                _ => {}
            }
        }

        let snapshot = engine.snapshot();
        let _ = writeln!(
            out,
            "Now: {} [{:?}, loop {:?}, volume {:.0}%]",
            snapshot
                .current_track
                .as_ref()
                .map_or("nothing", |t: &Track| t.title.as_str()),
            snapshot.state,
            snapshot.loop_mode,
            snapshot.volume * 100.0
        );
        Ok(out)
    }

    // ===== Chats =====

    /// Show `user`'s chats through the live synchronizer, optionally sending first
    pub async fn chats(&self, user: &str, outgoing: Option<OutgoingMessage>) -> Result<String> {
        let me = UserId::new(user);
        let sync = self.catalog.chat_synchronizer();
        let mut view = sync.watch();

        sync.subscribe(&me).await?;
        wait_for_view(&mut view, |v| v.sequence.is_some()).await?;

        if let Some(outgoing) = outgoing {
            let peer = UserId::new(outgoing.to);
            let chat = match self.catalog.get_chat_by_user(&me, &peer).await? {
                Some(chat) => chat.id,
                None => self.catalog.create_chat_with_user(&me, &peer).await?,
            };
            let sent = self.catalog.send_message(&me, &chat, &outgoing.text).await?;
            info!(chat = %chat, message = %sent, "Message sent");
            wait_for_view(&mut view, |v| has_message(v, &sent)).await?;
        }

        let current = sync.view();
        sync.unsubscribe().await;

        let mut out = String::new();
        if current.chats.is_empty() {
            let _ = writeln!(out, "No chats");
        }
        for chat in &current.chats {
            let peer = chat.peer(&me).map_or("?", |u| u.display_name.as_str());
            let _ = writeln!(out, "Chat with {peer}:");
            for message in &chat.messages {
                let sender = message
                    .sender
                    .as_ref()
                    .and_then(Link::resolved)
                    .map_or("?", |u| u.display_name.as_str());
                let _ = writeln!(out, "  {sender}: {}", message.content.value);
            }
        }
        Ok(out)
    }

    // ===== Session =====

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let backend = Arc::new(self.store.clone());
        let session = AuthSession::new(backend.clone(), backend.clone(), backend);
        session.init().await?;
        session.login(email, password).await?;
        let state = tokio::time::timeout(SYNC_TIMEOUT, session.wait_until_settled())
            .await
            .map_err(|_| CliError::Timeout("profile"))?;

        let name = session.display_name().unwrap_or_default();
        let mut out = format!("Signed in as {name} ({state:?})\n");
        if let Some(user) = session.user() {
            let _ = writeln!(out, "{} liked tracks", user.liked_tracks.len());
        }
        session.logout().await?;
        Ok(out)
    }

    /// Show the saved theme, switching it first when `toggle` is set
    pub fn theme(&self, toggle: bool) -> Result<String> {
        let prefs = FilePreferences::open(&self.config.session.preferences_path)?;
        let messages = MessageStore::new();
        let themes = ThemeStore::new(Arc::new(prefs), messages.clone());

        let mut out = String::new();
        if toggle {
            themes.toggle();
            let _ = writeln!(out, "{}", messages.current().text);
        }
        let _ = writeln!(out, "Theme: {}", themes.current().as_str());
        Ok(out)
    }
}

async fn wait_for_view(
    view: &mut watch::Receiver<ChatView>,
    predicate: impl FnMut(&ChatView) -> bool,
) -> Result<()> {
    match tokio::time::timeout(SYNC_TIMEOUT, view.wait_for(predicate)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(_)) | Err(_) => Err(CliError::Timeout("chat sync")),
    }
}

fn has_message(view: &ChatView, id: &MessageId) -> bool {
    view.chats
        .iter()
        .any(|chat| chat.messages.iter().any(|m| &m.id == id))
}

/// `m:ss`
fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
