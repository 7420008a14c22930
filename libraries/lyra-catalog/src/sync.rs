//! Live chat synchronizer
//!
//! Keeps a resolved copy of every chat the current user takes part in. Each
//! push from the backend is fully re-resolved and replaces the cache in one
//! step; a failed push leaves the previous cache in place.

use lyra_core::types::{Chat, Collection, UserId};
use lyra_core::{DocumentStore, LyraError, Result, SnapshotMessage, Subscription};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::chats;

/// Lifecycle of the standing chat query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Unsubscribed,
    /// Query registered, first push not processed yet
    Subscribing,
    Live,
}

/// Published cache contents
#[derive(Debug, Clone, Default)]
pub struct ChatView {
    pub chats: Vec<Chat>,

    /// Sequence of the snapshot `chats` was built from
    pub sequence: Option<u64>,

    /// Most recent push failure; cleared by the next successful push unless
    /// a newer failure arrived with it
    pub last_error: Option<String>,
}

/// Keeps the current user's chats live
pub struct ChatSynchronizer {
    store: Arc<dyn DocumentStore>,
    state: Arc<watch::Sender<SyncState>>,
    view: Arc<watch::Sender<ChatView>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ChatSynchronizer {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let (state, _) = watch::channel(SyncState::Unsubscribed);
        let (view, _) = watch::channel(ChatView::default());
        Self {
            store,
            state: Arc::new(state),
            view: Arc::new(view),
            task: Mutex::new(None),
        }
    }

    /// Register the standing query for `user` and start applying pushes
    ///
    /// An existing subscription is torn down first. Overlapping calls are
    /// serialized, so only the last one stays subscribed.
    pub async fn subscribe(&self, user: &UserId) -> Result<()> {
        let mut task = self.task.lock().await;
        self.teardown(&mut task).await;

        self.state.send_replace(SyncState::Subscribing);
        let subscription = match self
            .store
            .subscribe(Collection::Chats, chats::user_chats_query(user))
            .await
        {
            Ok(subscription) => subscription,
            Err(e) => {
                warn!(user = %user, error = %e, "Chat subscription failed");
                self.state.send_replace(SyncState::Unsubscribed);
                return Err(e);
            }
        };
        info!(user = %user, "Chat sync started");

        let store = Arc::clone(&self.store);
        let state = Arc::clone(&self.state);
        let view = Arc::clone(&self.view);
        *task = Some(tokio::spawn(async move {
            Self::sync_impl(store, subscription, &state, &view).await;
            state.send_replace(SyncState::Unsubscribed);
        }));
        Ok(())
    }

    /// Stop applying pushes and release the standing query
    ///
    /// The cache keeps its last contents.
    pub async fn unsubscribe(&self) {
        let mut task = self.task.lock().await;
        self.teardown(&mut task).await;
    }

    async fn teardown(&self, task: &mut Option<JoinHandle<()>>) {
        if let Some(handle) = task.take() {
            handle.abort();
            // Wait until the task (and its subscription) is gone
            let _ = handle.await;
            debug!("Chat sync stopped");
        }
        self.state.send_replace(SyncState::Unsubscribed);
    }

    pub fn state(&self) -> SyncState {
        *self.state.borrow()
    }

    /// Current cached chats
    pub fn chats(&self) -> Vec<Chat> {
        self.view.borrow().chats.clone()
    }

    pub fn view(&self) -> ChatView {
        self.view.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<ChatView> {
        self.view.subscribe()
    }

    pub fn watch_state(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    /// Whether the first push is still pending
    pub fn is_initial_loading(&self) -> bool {
        self.state() == SyncState::Subscribing
    }

    async fn sync_impl(
        store: Arc<dyn DocumentStore>,
        mut subscription: Subscription,
        state: &watch::Sender<SyncState>,
        view: &watch::Sender<ChatView>,
    ) {
        let mut applied: Option<u64> = None;

        while let Some(first) = subscription.next().await {
            // Coalesce to the newest queued snapshot; an error queued after
            // it is still reported once the snapshot is applied
            let mut latest = None;
            let mut trailing_error = None;
            let mut pending = Some(first);
            while let Some(message) = pending {
                match message {
                    SnapshotMessage::Snapshot {
                        sequence,
                        documents,
                    } => {
                        latest = Some((sequence, documents));
                        trailing_error = None;
                    }
                    SnapshotMessage::Error(e) => {
                        warn!(error = %e, "Chat push failed");
                        trailing_error = Some(e);
                    }
                }
                pending = subscription.try_next();
            }

            let Some((sequence, documents)) = latest else {
                report_error(view, trailing_error);
                state.send_replace(SyncState::Live);
                continue;
            };

            if applied.is_some_and(|seen| sequence <= seen) {
                debug!(sequence, applied = ?applied, "Skipping stale chat snapshot");
                report_error(view, trailing_error);
                continue;
            }

            match chats::resolve(store.as_ref(), &documents).await {
                Ok(resolved) => {
                    applied = Some(sequence);
                    debug!(sequence, chats = resolved.len(), "Chat cache replaced");
                    view.send_modify(|view| {
                        view.chats = resolved;
                        view.sequence = Some(sequence);
                        view.last_error = trailing_error.map(|e| e.to_string());
                    });
                }
                Err(e) => {
                    warn!(sequence, error = %e, "Chat resolution failed; keeping previous cache");
                    report_error(view, Some(e));
                }
            }
            state.send_replace(SyncState::Live);
        }

        debug!("Chat subscription closed by backend");
    }
}

fn report_error(view: &watch::Sender<ChatView>, error: Option<LyraError>) {
    if let Some(e) = error {
        view.send_modify(|view| view.last_error = Some(e.to_string()));
    }
}

impl Drop for ChatSynchronizer {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}
