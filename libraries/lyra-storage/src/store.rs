//! In-memory document store with live queries

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use lyra_core::error::{LyraError, Result};
use lyra_core::storage::{DocumentStore, SnapshotMessage, Subscription};
use lyra_core::types::{Collection, DocRef, Document, Fields, Query, Updates, WriteBatch};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::auth::Accounts;
use crate::updates;

/// A registered standing query
struct Watcher {
    id: u64,
    collection: Collection,
    query: Query,
    sender: mpsc::UnboundedSender<SnapshotMessage>,
}

#[derive(Default)]
pub(crate) struct State {
    collections: HashMap<Collection, BTreeMap<String, Fields>>,
    /// Bumped on every committed write
    sequence: u64,
    last_timestamp: Option<DateTime<Utc>>,
    watchers: Vec<Watcher>,
    next_watcher_id: u64,
    failing_fetches: usize,
    failing_pushes: usize,
    fetch_delays: HashMap<DocRef, Duration>,
    pub(crate) blobs: BTreeMap<String, Vec<u8>>,
    pub(crate) accounts: Accounts,
}

impl State {
    /// Backend clock; strictly increasing so `createdAt` ordering is total
    fn now(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + ChronoDuration::microseconds(1);
            }
        }
        self.last_timestamp = Some(now);
        now
    }

    fn documents(&self, collection: Collection) -> impl Iterator<Item = Document> + '_ {
        self.collections
            .get(&collection)
            .into_iter()
            .flat_map(move |docs| {
                docs.iter().map(move |(id, fields)| {
                    Document::new(DocRef::new(collection, id.as_str()), fields.clone())
                })
            })
    }

    fn get(&self, doc_ref: &DocRef) -> Option<Document> {
        self.collections
            .get(&doc_ref.collection)
            .and_then(|docs| docs.get(&doc_ref.id))
            .map(|fields| Document::new(doc_ref.clone(), fields.clone()))
    }

    fn put(&mut self, doc_ref: &DocRef, fields: Fields) {
        self.collections
            .entry(doc_ref.collection)
            .or_default()
            .insert(doc_ref.id.clone(), fields);
    }

    fn take_fetch_failure(&mut self) -> Result<()> {
        if self.failing_fetches > 0 {
            self.failing_fetches -= 1;
            return Err(LyraError::unavailable("injected fetch failure"));
        }
        Ok(())
    }

    /// Bump the sequence and push a fresh snapshot to every watcher of the
    /// touched collections
    fn publish(&mut self, touched: &BTreeSet<Collection>) {
        self.sequence += 1;
        let sequence = self.sequence;
        let failing = self.failing_pushes > 0;
        if failing {
            self.failing_pushes -= 1;
        }

        let mut closed = Vec::new();
        for watcher in self.watchers.iter().filter(|w| touched.contains(&w.collection)) {
            let message = if failing {
                SnapshotMessage::Error(LyraError::unavailable("injected push failure"))
            } else {
                let documents = watcher.query.apply(self.documents(watcher.collection));
                SnapshotMessage::Snapshot {
                    sequence,
                    documents,
                }
            };
            if watcher.sender.send(message).is_err() {
                closed.push(watcher.id);
            }
        }
        self.watchers.retain(|w| !closed.contains(&w.id));
    }
}

/// In-memory backend
///
/// Cheap to clone; clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, State> {
        lock(&self.state)
    }

    /// Synchronous read for assertions and tooling
    pub fn get(&self, doc_ref: &DocRef) -> Option<Document> {
        self.state().get(doc_ref)
    }

    /// Number of documents in a collection
    pub fn count(&self, collection: Collection) -> usize {
        self.state()
            .collections
            .get(&collection)
            .map_or(0, BTreeMap::len)
    }

    /// Current write sequence
    pub fn sequence(&self) -> u64 {
        self.state().sequence
    }

    /// Number of live standing queries
    pub fn watcher_count(&self) -> usize {
        self.state().watchers.len()
    }

    /// Make the next `n` document fetches fail with a transient error
    pub fn fail_next_fetches(&self, n: usize) {
        self.state().failing_fetches = n;
    }

    /// Make the next `n` live-query pushes deliver an error instead of a snapshot
    pub fn fail_next_pushes(&self, n: usize) {
        self.state().failing_pushes = n;
    }

    /// Delay every fetch of one document
    pub fn set_fetch_delay(&self, doc_ref: DocRef, delay: Duration) {
        self.state().fetch_delays.insert(doc_ref, delay);
    }

    /// Write a document without stamping or notifying (fixture loading)
    pub(crate) fn insert_raw(&self, doc_ref: &DocRef, fields: Fields) {
        self.state().put(doc_ref, fields);
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn unsubscribe(state: &Weak<Mutex<State>>, id: u64) {
    if let Some(state) = state.upgrade() {
        lock(&state).watchers.retain(|w| w.id != id);
        tracing::debug!(watcher = id, "Live query closed");
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch_document(&self, doc_ref: &DocRef) -> Result<Option<Document>> {
        let delay = {
            let mut state = self.state();
            state.take_fetch_failure()?;
            state.fetch_delays.get(doc_ref).copied()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.state().get(doc_ref))
    }

    async fn fetch_many(&self, collection: Collection, query: &Query) -> Result<Vec<Document>> {
        let mut state = self.state();
        state.take_fetch_failure()?;
        Ok(query.apply(state.documents(collection)))
    }

    async fn create_document(&self, collection: Collection, fields: Fields) -> Result<String> {
        let doc_ref = self.allocate_ref(collection);
        self.set_document(&doc_ref, fields).await?;
        Ok(doc_ref.id)
    }

    async fn set_document(&self, doc_ref: &DocRef, fields: Fields) -> Result<()> {
        let mut state = self.state();
        let now = state.now();
        state.put(doc_ref, updates::stamp(fields, now));
        state.publish(&BTreeSet::from([doc_ref.collection]));
        tracing::debug!(doc = %doc_ref, "Document written");
        Ok(())
    }

    async fn update_document(&self, doc_ref: &DocRef, changes: Updates) -> Result<()> {
        let mut state = self.state();
        let now = state.now();
        let mut fields = state
            .get(doc_ref)
            .map(|doc| doc.fields)
            .ok_or_else(|| LyraError::DocumentNotFound(doc_ref.clone()))?;
        for (field, update) in changes {
            updates::apply(&mut fields, &field, update, now);
        }
        state.put(doc_ref, fields);
        state.publish(&BTreeSet::from([doc_ref.collection]));
        tracing::debug!(doc = %doc_ref, "Document updated");
        Ok(())
    }

    fn allocate_ref(&self, collection: Collection) -> DocRef {
        DocRef::new(collection, Uuid::new_v4().simple().to_string())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        let mut state = self.state();
        let now = state.now();
        let mut touched = BTreeSet::new();
        let writes = batch.into_writes();
        let count = writes.len();
        for (doc_ref, fields) in writes {
            touched.insert(doc_ref.collection);
            state.put(&doc_ref, updates::stamp(fields, now));
        }
        if !touched.is_empty() {
            state.publish(&touched);
        }
        tracing::debug!(writes = count, "Batch committed");
        Ok(())
    }

    async fn subscribe(&self, collection: Collection, query: Query) -> Result<Subscription> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut state = self.state();

        let id = state.next_watcher_id;
        state.next_watcher_id += 1;

        let documents = query.apply(state.documents(collection));
        let initial = SnapshotMessage::Snapshot {
            sequence: state.sequence,
            documents,
        };
        // Receiver is still in scope; cannot fail
        let _ = sender.send(initial);

        state.watchers.push(Watcher {
            id,
            collection,
            query,
            sender,
        });
        drop(state);

        tracing::debug!(watcher = id, collection = %collection, "Live query registered");
        let weak = Arc::downgrade(&self.state);
        Ok(Subscription::new(receiver, move || unsubscribe(&weak, id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyra_core::fields;
    use lyra_core::types::{FieldUpdate, Filter};

    #[tokio::test]
    async fn update_of_missing_document_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_document(
                &DocRef::new(Collection::Users, "ghost"),
                vec![("likedTracks".into(), FieldUpdate::array_union("t1"))],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LyraError::DocumentNotFound(_)));
    }

    #[tokio::test]
    async fn injected_fetch_failures_are_consumed() {
        let store = MemoryStore::new();
        store.fail_next_fetches(1);
        let missing = DocRef::new(Collection::Tracks, "t1");

        assert!(store.fetch_document(&missing).await.unwrap_err().is_transient());
        assert!(store.fetch_document(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn subscription_drop_removes_watcher() {
        let store = MemoryStore::new();
        let sub = store
            .subscribe(
                Collection::Chats,
                Query::all().filter(Filter::array_contains("participants", "u1")),
            )
            .await
            .unwrap();
        assert_eq!(store.watcher_count(), 1);
        drop(sub);
        assert_eq!(store.watcher_count(), 0);
    }

    #[tokio::test]
    async fn server_timestamps_are_strictly_increasing() {
        let store = MemoryStore::new();
        let stamped = || fields! { "createdAt" => lyra_core::Value::ServerTimestamp };
        let a = store
            .create_document(Collection::Comments, stamped())
            .await
            .unwrap();
        let b = store
            .create_document(Collection::Comments, stamped())
            .await
            .unwrap();

        let at = |id: &str| {
            store
                .get(&DocRef::new(Collection::Comments, id))
                .and_then(|d| d.get("createdAt").cloned())
                .unwrap()
        };
        assert_eq!(at(&a).order_cmp(&at(&b)), std::cmp::Ordering::Less);
    }
}
