use futures::future::try_join_all;
use lyra_core::fields;
use lyra_core::types::{
    Album, AlbumId, AlbumSummary, Collection, CreateAlbum, Document, Filter, Link, Query, UserId,
    Value, WriteBatch,
};
use lyra_core::{BlobStore, DocumentStore, LyraError, Result};
use uuid::Uuid;

use crate::artists;
use crate::likes::{self, LikeKind};
use crate::resolver::{decode_plain, Resolver};
use crate::shapes;

/// Upload the cover and every audio file, then write the album and its
/// tracks in one batch
///
/// Tracks get their position as `order`; the album stores the summed
/// duration and whether any track is explicit.
pub async fn create(
    store: &dyn DocumentStore,
    blobs: &dyn BlobStore,
    author: &UserId,
    album: CreateAlbum,
) -> Result<AlbumId> {
    if album.title.trim().is_empty() {
        return Err(LyraError::invalid_input("album title is empty"));
    }

    let duration = album.total_duration();
    let is_explicit = album.is_explicit();

    let image_url = blobs
        .upload_blob(&format!("albumCovers/{}_albumCover", Uuid::new_v4()), album.cover)
        .await?;

    let album_ref = store.allocate_ref(Collection::Albums);
    let author_ref = author.doc_ref();

    let mut batch = WriteBatch::new();
    let mut track_refs = Vec::with_capacity(album.tracks.len());

    for (order, track) in album.tracks.into_iter().enumerate() {
        let audio_url = blobs
            .upload_blob(&format!("tracks/{}_track", Uuid::new_v4()), track.audio)
            .await?;

        let track_ref = store.allocate_ref(Collection::Tracks);
        batch.set(
            track_ref.clone(),
            fields! {
                "title" => track.title.as_str(),
                "titleLower" => track.title.to_lowercase(),
                "author" => author_ref.clone(),
                "album" => album_ref.clone(),
                "genre" => track.genre,
                "imageURL" => image_url.as_str(),
                "audioURL" => audio_url,
                "duration" => track.duration,
                "isExplicit" => track.is_explicit,
                "createdAt" => Value::ServerTimestamp,
                "order" => order as i64,
            },
        );
        track_refs.push(track_ref);
    }

    let track_count = track_refs.len();
    batch.set(
        album_ref.clone(),
        fields! {
            "title" => album.title,
            "description" => album.description.unwrap_or_default(),
            "imageURL" => image_url,
            "author" => author_ref,
            "tracks" => track_refs,
            "genre" => album.genre,
            "duration" => duration,
            "isExplicit" => is_explicit,
            "createdAt" => Value::ServerTimestamp,
        },
    );

    store.commit(batch).await?;
    tracing::info!(album = %album_ref, author = %author, tracks = track_count, "Album created");
    Ok(AlbumId::new(album_ref.id))
}

/// Resolve author and tracks, then fill in the author's listener count
async fn details(store: &dyn DocumentStore, doc: &Document) -> Result<Album> {
    let mut album: Album = Resolver::new(store).resolve_as(doc, &shapes::album()).await?;
    if let Some(Link::Resolved(author)) = album.author.as_mut() {
        author.listeners_count = Some(artists::listeners_count(store, &author.id).await?);
    }
    Ok(album)
}

pub async fn get_by_id(store: &dyn DocumentStore, id: &AlbumId) -> Result<Option<Album>> {
    match store.fetch_document(&id.doc_ref()).await? {
        Some(doc) => Ok(Some(details(store, &doc).await?)),
        None => Ok(None),
    }
}

pub async fn get_all(store: &dyn DocumentStore) -> Result<Vec<Album>> {
    let docs = store.fetch_many(Collection::Albums, &Query::all()).await?;
    try_join_all(docs.iter().map(|doc| details(store, doc))).await
}

/// Albums in `ids` order, dropping missing albums and albums without tracks
pub async fn get_by_refs(store: &dyn DocumentStore, ids: &[AlbumId]) -> Result<Vec<Album>> {
    let albums = try_join_all(ids.iter().map(|id| get_by_id(store, id))).await?;
    Ok(albums
        .into_iter()
        .flatten()
        .filter(|album| !album.tracks.is_empty())
        .collect())
}

pub async fn get_liked(store: &dyn DocumentStore, user: &UserId) -> Result<Vec<Album>> {
    let ids = likes::liked_ids(store, user, LikeKind::Album).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let docs = store
        .fetch_many(Collection::Albums, &Query::all().filter(Filter::IdIn(ids)))
        .await?;
    try_join_all(docs.iter().map(|doc| details(store, doc))).await
}

/// Albums published by `author`, track list as ids
pub async fn get_by_author(store: &dyn DocumentStore, author: &UserId) -> Result<Vec<AlbumSummary>> {
    let query = Query::all().filter(Filter::eq("author", author.doc_ref()));
    let docs = store.fetch_many(Collection::Albums, &query).await?;
    docs.iter().map(decode_plain).collect()
}
