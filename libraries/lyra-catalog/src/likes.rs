//! Liked tracks, albums and artists
//!
//! Likes are plain ids kept in set-like arrays on the user document.

use lyra_core::types::{FieldUpdate, UserId};
use lyra_core::{DocumentStore, Result};

/// Which liked list to touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeKind {
    Track,
    Album,
    Artist,
}

impl LikeKind {
    /// Array field on the user document
    pub fn field(self) -> &'static str {
        match self {
            LikeKind::Track => "likedTracks",
            LikeKind::Album => "likedAlbums",
            LikeKind::Artist => "likedArtists",
        }
    }
}

/// Add `target_id` to the user's liked list; liking twice keeps one entry
pub async fn like(
    store: &dyn DocumentStore,
    user: &UserId,
    kind: LikeKind,
    target_id: &str,
) -> Result<()> {
    store
        .update_document(
            &user.doc_ref(),
            vec![(kind.field().to_string(), FieldUpdate::array_union(target_id))],
        )
        .await?;
    tracing::debug!(user = %user, kind = ?kind, id = target_id, "Liked");
    Ok(())
}

/// Remove `target_id` from the user's liked list
pub async fn unlike(
    store: &dyn DocumentStore,
    user: &UserId,
    kind: LikeKind,
    target_id: &str,
) -> Result<()> {
    store
        .update_document(
            &user.doc_ref(),
            vec![(kind.field().to_string(), FieldUpdate::array_remove(target_id))],
        )
        .await?;
    tracing::debug!(user = %user, kind = ?kind, id = target_id, "Unliked");
    Ok(())
}

/// Ids in the user's liked list; empty when the user document is missing
pub async fn liked_ids(store: &dyn DocumentStore, user: &UserId, kind: LikeKind) -> Result<Vec<String>> {
    let Some(doc) = store.fetch_document(&user.doc_ref()).await? else {
        return Ok(Vec::new());
    };
    Ok(doc
        .get_strings(kind.field())
        .into_iter()
        .map(str::to_string)
        .collect())
}
