use lyra_core::fields;
use lyra_core::types::{
    AlbumId, Collection, Comment, CommentId, Direction, FieldUpdate, Filter, Query, UserId, Value,
};
use lyra_core::{DocumentStore, LyraError, Result};

use crate::resolver::Resolver;
use crate::shapes;

/// Top-level comments on an album
pub async fn fetch_root(store: &dyn DocumentStore, album: &AlbumId) -> Result<Vec<Comment>> {
    let query = Query::all()
        .filter(Filter::eq("album", album.doc_ref()))
        .filter(Filter::is_null("parent"));
    let docs = store.fetch_many(Collection::Comments, &query).await?;
    Resolver::new(store)
        .resolve_all_as(&docs, &shapes::comment())
        .await
}

/// Direct replies to `parent`, oldest first
pub async fn fetch_replies(
    store: &dyn DocumentStore,
    album: &AlbumId,
    parent: &CommentId,
) -> Result<Vec<Comment>> {
    let query = Query::all()
        .filter(Filter::eq("album", album.doc_ref()))
        .filter(Filter::eq("parent", parent.doc_ref()))
        .order_by("createdAt", Direction::Asc);
    let docs = store.fetch_many(Collection::Comments, &query).await?;
    Resolver::new(store)
        .resolve_all_as(&docs, &shapes::comment())
        .await
}

/// Post a comment; a reply also bumps the parent's `replies` counter
pub async fn upload(
    store: &dyn DocumentStore,
    album: &AlbumId,
    user: &UserId,
    text: &str,
    parent: Option<&CommentId>,
) -> Result<CommentId> {
    if text.trim().is_empty() {
        return Err(LyraError::invalid_input("comment text is empty"));
    }

    if let Some(parent) = parent {
        let bump = vec![("replies".to_string(), FieldUpdate::Increment(1))];
        match store.update_document(&parent.doc_ref(), bump).await {
            Ok(()) => {}
            // Parent deleted meanwhile: post the reply anyway
            Err(LyraError::DocumentNotFound(_)) => {
                tracing::debug!(parent = %parent, "Parent comment missing");
            }
            Err(e) => return Err(e),
        }
    }

    let id = store
        .create_document(
            Collection::Comments,
            fields! {
                "text" => text,
                "album" => album.doc_ref(),
                "user" => user.doc_ref(),
                "createdAt" => Value::ServerTimestamp,
                "likes" => 0,
                "replies" => 0,
                "parent" => parent.map(CommentId::doc_ref),
            },
        )
        .await?;

    tracing::debug!(comment = %id, album = %album, "Comment posted");
    Ok(CommentId::new(id))
}
