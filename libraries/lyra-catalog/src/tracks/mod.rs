use lyra_core::types::{Collection, Filter, Query, Track, TrackId, UserId};
use lyra_core::{DocumentStore, Result};

use crate::likes::{self, LikeKind};
use crate::resolver::Resolver;
use crate::shapes;

pub async fn get_by_id(store: &dyn DocumentStore, id: &TrackId) -> Result<Option<Track>> {
    let Some(doc) = store.fetch_document(&id.doc_ref()).await? else {
        return Ok(None);
    };
    let track = Resolver::new(store).resolve_as(&doc, &shapes::track()).await?;
    Ok(Some(track))
}

/// Tracks whose id is in `ids`; missing ids are skipped
pub async fn get_by_ids(store: &dyn DocumentStore, ids: &[TrackId]) -> Result<Vec<Track>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let query = Query::all().filter(Filter::IdIn(
        ids.iter().map(|id| id.as_str().to_string()).collect(),
    ));
    let docs = store.fetch_many(Collection::Tracks, &query).await?;
    Resolver::new(store)
        .resolve_all_as(&docs, &shapes::track())
        .await
}

pub async fn get_all(store: &dyn DocumentStore) -> Result<Vec<Track>> {
    let docs = store.fetch_many(Collection::Tracks, &Query::all()).await?;
    Resolver::new(store)
        .resolve_all_as(&docs, &shapes::track())
        .await
}

pub async fn get_liked(store: &dyn DocumentStore, user: &UserId) -> Result<Vec<Track>> {
    let ids: Vec<TrackId> = likes::liked_ids(store, user, LikeKind::Track)
        .await?
        .into_iter()
        .map(TrackId::from)
        .collect();
    get_by_ids(store, &ids).await
}

/// Tracks published by `author`, references left as ids
pub async fn get_by_author(store: &dyn DocumentStore, author: &UserId) -> Result<Vec<Track>> {
    let query = Query::all().filter(Filter::eq("author", author.doc_ref()));
    let docs = store.fetch_many(Collection::Tracks, &query).await?;
    docs.iter().map(crate::resolver::decode_plain).collect()
}
