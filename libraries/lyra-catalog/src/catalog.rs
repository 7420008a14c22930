use async_trait::async_trait;
use lyra_core::types::{
    Album, AlbumId, Artist, Chat, ChatId, ChatSummary, Comment, CommentId, CreateAlbum,
    CreateReport, MessageId, Report, ReportId, ReportResolution, Track, TrackId, UserId,
};
use lyra_core::{BlobStore, DocumentStore, LyraError, Result, TrackLoader};
use std::sync::Arc;

use crate::likes::{self, LikeKind};
use crate::sync::ChatSynchronizer;
use crate::{albums, artists, chats, comments, reports, tracks};

/// Catalog access over a document store and a blob store
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
}

impl Catalog {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// A synchronizer sharing this catalog's store
    pub fn chat_synchronizer(&self) -> ChatSynchronizer {
        ChatSynchronizer::new(Arc::clone(&self.store))
    }

    // Tracks
    pub async fn get_track_by_id(&self, id: &TrackId) -> Result<Option<Track>> {
        tracks::get_by_id(self.store.as_ref(), id).await
    }

    pub async fn get_tracks_by_ids(&self, ids: &[TrackId]) -> Result<Vec<Track>> {
        tracks::get_by_ids(self.store.as_ref(), ids).await
    }

    pub async fn get_all_tracks(&self) -> Result<Vec<Track>> {
        tracks::get_all(self.store.as_ref()).await
    }

    pub async fn get_liked_tracks(&self, user: &UserId) -> Result<Vec<Track>> {
        tracks::get_liked(self.store.as_ref(), user).await
    }

    pub async fn like_track(&self, user: &UserId, id: &TrackId) -> Result<()> {
        likes::like(self.store.as_ref(), user, LikeKind::Track, id.as_str()).await
    }

    pub async fn dislike_track(&self, user: &UserId, id: &TrackId) -> Result<()> {
        likes::unlike(self.store.as_ref(), user, LikeKind::Track, id.as_str()).await
    }

    // Albums
    pub async fn create_album(&self, author: &UserId, album: CreateAlbum) -> Result<AlbumId> {
        albums::create(self.store.as_ref(), self.blobs.as_ref(), author, album).await
    }

    pub async fn get_album_by_id(&self, id: &AlbumId) -> Result<Option<Album>> {
        albums::get_by_id(self.store.as_ref(), id).await
    }

    pub async fn get_all_albums(&self) -> Result<Vec<Album>> {
        albums::get_all(self.store.as_ref()).await
    }

    pub async fn get_albums_by_refs(&self, ids: &[AlbumId]) -> Result<Vec<Album>> {
        albums::get_by_refs(self.store.as_ref(), ids).await
    }

    pub async fn get_liked_albums(&self, user: &UserId) -> Result<Vec<Album>> {
        albums::get_liked(self.store.as_ref(), user).await
    }

    pub async fn like_album(&self, user: &UserId, id: &AlbumId) -> Result<()> {
        likes::like(self.store.as_ref(), user, LikeKind::Album, id.as_str()).await
    }

    pub async fn dislike_album(&self, user: &UserId, id: &AlbumId) -> Result<()> {
        likes::unlike(self.store.as_ref(), user, LikeKind::Album, id.as_str()).await
    }

    // Artists
    pub async fn listeners_count(&self, artist: &UserId) -> Result<u64> {
        artists::listeners_count(self.store.as_ref(), artist).await
    }

    pub async fn get_artist_by_id(&self, id: &UserId) -> Result<Option<Artist>> {
        artists::get_by_id(self.store.as_ref(), id).await
    }

    pub async fn get_all_artists(&self) -> Result<Vec<Artist>> {
        artists::get_all(self.store.as_ref()).await
    }

    pub async fn like_artist(&self, user: &UserId, artist: &UserId) -> Result<()> {
        likes::like(self.store.as_ref(), user, LikeKind::Artist, artist.as_str()).await
    }

    pub async fn dislike_artist(&self, user: &UserId, artist: &UserId) -> Result<()> {
        likes::unlike(self.store.as_ref(), user, LikeKind::Artist, artist.as_str()).await
    }

    // Comments
    pub async fn fetch_root_comments(&self, album: &AlbumId) -> Result<Vec<Comment>> {
        comments::fetch_root(self.store.as_ref(), album).await
    }

    pub async fn fetch_replies(&self, album: &AlbumId, parent: &CommentId) -> Result<Vec<Comment>> {
        comments::fetch_replies(self.store.as_ref(), album, parent).await
    }

    pub async fn upload_comment(
        &self,
        album: &AlbumId,
        user: &UserId,
        text: &str,
        parent: Option<&CommentId>,
    ) -> Result<CommentId> {
        comments::upload(self.store.as_ref(), album, user, text, parent).await
    }

    // Reports
    pub async fn fetch_reports(&self) -> Result<Vec<Report>> {
        reports::fetch_all(self.store.as_ref()).await
    }

    pub async fn create_report(&self, report: CreateReport) -> Result<ReportId> {
        reports::create(self.store.as_ref(), report).await
    }

    pub async fn update_report_status(&self, id: &ReportId, resolution: ReportResolution) -> Result<()> {
        reports::update_status(self.store.as_ref(), id, resolution).await
    }

    // Chats
    pub async fn create_chat_with_user(&self, me: &UserId, other: &UserId) -> Result<ChatId> {
        chats::create_with_user(self.store.as_ref(), me, other).await
    }

    pub async fn get_chat_by_user(&self, me: &UserId, other: &UserId) -> Result<Option<ChatSummary>> {
        chats::get_by_user(self.store.as_ref(), me, other).await
    }

    pub async fn send_message(&self, sender: &UserId, chat: &ChatId, text: &str) -> Result<MessageId> {
        chats::send_message(self.store.as_ref(), sender, chat, text).await
    }

    pub async fn fetch_chats(&self, user: &UserId) -> Result<Vec<Chat>> {
        chats::fetch_for_user(self.store.as_ref(), user).await
    }
}

#[async_trait]
impl TrackLoader for Catalog {
    async fn load_track(&self, id: &TrackId) -> Result<Track> {
        self.get_track_by_id(id)
            .await?
            .ok_or_else(|| LyraError::not_found("track", id.as_str()))
    }
}
