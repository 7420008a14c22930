//! Document store abstraction
//!
//! Lyra owns no database. Persistence, querying and real-time fan-out are
//! delegated to a hosted backend reached through [`DocumentStore`].

use crate::error::{LyraError, Result};
use crate::types::{Collection, DocRef, Document, Fields, Query, Updates, WriteBatch};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Access to the backend's document collections
///
/// Implementations report "no such document" as `Ok(None)` and reserve errors
/// for transport and backend failures.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    // ========================================================================
    // Reads
    // ========================================================================

    /// Fetch a single document, `None` if it does not exist
    async fn fetch_document(&self, doc_ref: &DocRef) -> Result<Option<Document>>;

    /// Fetch every document of a collection matching the query
    async fn fetch_many(&self, collection: Collection, query: &Query) -> Result<Vec<Document>>;

    // ========================================================================
    // Writes
    // ========================================================================

    /// Create a document with a backend-assigned id
    async fn create_document(&self, collection: Collection, fields: Fields) -> Result<String>;

    /// Create or overwrite a document at a known reference
    async fn set_document(&self, doc_ref: &DocRef, fields: Fields) -> Result<()>;

    /// Apply partial updates to an existing document
    async fn update_document(&self, doc_ref: &DocRef, updates: Updates) -> Result<()>;

    /// Reserve a fresh document reference without writing anything
    fn allocate_ref(&self, collection: Collection) -> DocRef;

    /// Apply every write of the batch or none of them
    async fn commit(&self, batch: WriteBatch) -> Result<()>;

    // ========================================================================
    // Live queries
    // ========================================================================

    /// Register a standing query
    ///
    /// The first message is the current result set; every later write that
    /// touches the collection pushes a fresh full snapshot.
    async fn subscribe(&self, collection: Collection, query: Query) -> Result<Subscription>;
}

/// One push from a standing query
#[derive(Debug)]
pub enum SnapshotMessage {
    /// Full result set as of `sequence`
    Snapshot {
        /// Monotonically increasing across the store
        sequence: u64,
        documents: Vec<Document>,
    },
    /// The backend failed to evaluate the query for this push
    Error(LyraError),
}

/// Handle to a standing query; dropping it unsubscribes
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<SnapshotMessage>,
    on_drop: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Wrap a message channel; `on_drop` runs once when the handle goes away
    pub fn new(
        receiver: mpsc::UnboundedReceiver<SnapshotMessage>,
        on_drop: impl FnOnce() + Send + Sync + 'static,
    ) -> Self {
        Self {
            receiver,
            on_drop: Some(Box::new(on_drop)),
        }
    }

    /// Wait for the next push; `None` once the backend closed the query
    pub async fn next(&mut self) -> Option<SnapshotMessage> {
        self.receiver.recv().await
    }

    /// Take an already queued push without waiting
    pub fn try_next(&mut self) -> Option<SnapshotMessage> {
        self.receiver.try_recv().ok()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(on_drop) = self.on_drop.take() {
            on_drop();
        }
    }
}
