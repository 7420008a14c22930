use futures::future::try_join_all;
use lyra_core::types::{Artist, Collection, Document, Filter, Query, UserId};
use lyra_core::{DocumentStore, Result};
use std::collections::HashSet;

use crate::resolver::decode_plain;
use crate::{albums, tracks};

/// Number of users who liked at least one of the artist's tracks
///
/// Scans every user document; the count is consistent only as of the call.
pub async fn listeners_count(store: &dyn DocumentStore, artist: &UserId) -> Result<u64> {
    let query = Query::all().filter(Filter::eq("author", artist.doc_ref()));
    let artist_tracks = store.fetch_many(Collection::Tracks, &query).await?;
    if artist_tracks.is_empty() {
        return Ok(0);
    }
    let track_ids: HashSet<&str> = artist_tracks.iter().map(Document::id).collect();

    let users = store.fetch_many(Collection::Users, &Query::all()).await?;
    let count = users
        .iter()
        .filter(|user| {
            user.get_strings("likedTracks")
                .into_iter()
                .any(|id| track_ids.contains(id))
        })
        .count();

    tracing::debug!(artist = %artist, tracks = track_ids.len(), listeners = count, "Counted listeners");
    Ok(count as u64)
}

async fn details(store: &dyn DocumentStore, doc: &Document) -> Result<Artist> {
    let id = UserId::new(doc.id());
    let (listeners_count, albums, tracks) = futures::try_join!(
        listeners_count(store, &id),
        albums::get_by_author(store, &id),
        tracks::get_by_author(store, &id),
    )?;

    let mut artist: Artist = decode_plain(doc)?;
    artist.listeners_count = listeners_count;
    artist.albums = albums;
    artist.tracks = tracks;
    Ok(artist)
}

pub async fn get_by_id(store: &dyn DocumentStore, id: &UserId) -> Result<Option<Artist>> {
    match store.fetch_document(&id.doc_ref()).await? {
        Some(doc) => Ok(Some(details(store, &doc).await?)),
        None => Ok(None),
    }
}

/// Every user that is not an admin, as an artist
pub async fn get_all(store: &dyn DocumentStore) -> Result<Vec<Artist>> {
    let query = Query::all().filter(Filter::not_eq("role", "admin"));
    let docs = store.fetch_many(Collection::Users, &query).await?;
    try_join_all(docs.iter().map(|doc| details(store, doc))).await
}
