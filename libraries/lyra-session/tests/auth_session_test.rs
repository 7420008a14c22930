//! Integration tests for the auth session over the in-memory backend

use async_trait::async_trait;
use lyra_core::types::{
    Collection, DocRef, Document, FieldUpdate, Fields, ProfileUpdate, Query, TrackId, Updates,
    WriteBatch,
};
use lyra_core::{
    AuthProvider, DocumentStore, LyraError, Result, SnapshotMessage, Subscription,
};
use lyra_session::{AuthSession, AuthState, Registration, SessionError};
use lyra_storage::auth::codes;
use lyra_storage::MemoryStore;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use std::time::Duration;

// ============================================================================
// Test Infrastructure
// ============================================================================

fn backend() -> MemoryStore {
    let store = MemoryStore::from_json(json!({
        "users": {
            "u1": {"displayName": "Mira", "role": "user", "likedTracks": ["t1"]},
            "root": {"displayName": "Root", "role": "admin"},
        }
    }))
    .unwrap();
    store.add_account("mira@example.com", "secret1", "u1").unwrap();
    store.add_account("root@example.com", "secret1", "root").unwrap();
    store
}

fn session(store: &MemoryStore) -> AuthSession {
    let backend = Arc::new(store.clone());
    AuthSession::new(backend.clone(), backend.clone(), backend)
}

/// How [`ProfileStore`] answers `subscribe`
#[derive(Clone, Copy)]
enum Feed {
    /// Suspend once, then register the real query
    Yield,
    /// Deliver a backend error as the first push
    FailFirstPush,
}

/// Store wrapper that controls the profile query
struct ProfileStore {
    inner: MemoryStore,
    feed: Feed,
    open: Mutex<Vec<mpsc::UnboundedSender<SnapshotMessage>>>,
}

impl ProfileStore {
    fn new(inner: MemoryStore, feed: Feed) -> Self {
        Self {
            inner,
            feed,
            open: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DocumentStore for ProfileStore {
    async fn fetch_document(&self, doc_ref: &DocRef) -> Result<Option<Document>> {
        self.inner.fetch_document(doc_ref).await
    }

    async fn fetch_many(&self, collection: Collection, query: &Query) -> Result<Vec<Document>> {
        self.inner.fetch_many(collection, query).await
    }

    async fn create_document(&self, collection: Collection, fields: Fields) -> Result<String> {
        self.inner.create_document(collection, fields).await
    }

    async fn set_document(&self, doc_ref: &DocRef, fields: Fields) -> Result<()> {
        self.inner.set_document(doc_ref, fields).await
    }

    async fn update_document(&self, doc_ref: &DocRef, updates: Updates) -> Result<()> {
        self.inner.update_document(doc_ref, updates).await
    }

    fn allocate_ref(&self, collection: Collection) -> DocRef {
        self.inner.allocate_ref(collection)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        self.inner.commit(batch).await
    }

    async fn subscribe(&self, collection: Collection, query: Query) -> Result<Subscription> {
        match self.feed {
            Feed::Yield => {
                tokio::task::yield_now().await;
                self.inner.subscribe(collection, query).await
            }
            Feed::FailFirstPush => {
                let (tx, rx) = mpsc::unbounded_channel();
                tx.send(SnapshotMessage::Error(LyraError::unavailable("profile offline")))
                    .unwrap();
                self.open.lock().unwrap().push(tx);
                Ok(Subscription::new(rx, || {}))
            }
        }
    }
}

fn session_over(store: &MemoryStore, feed: Feed) -> AuthSession {
    let auth = Arc::new(store.clone());
    AuthSession::new(
        auth.clone(),
        Arc::new(ProfileStore::new(store.clone(), feed)),
        auth,
    )
}

async fn settled(session: &AuthSession) -> AuthState {
    tokio::time::timeout(Duration::from_secs(5), session.wait_until_settled())
        .await
        .expect("session never settled")
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn init_without_user_is_guest() {
    let store = backend();
    let session = session(&store);
    assert_eq!(session.state(), AuthState::Unknown);

    assert!(session.init().await.unwrap().is_none());

    assert_eq!(settled(&session).await, AuthState::Guest);
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn init_restores_signed_in_user() {
    let store = backend();
    store.sign_in("mira@example.com", "secret1").await.unwrap();
    let session = session(&store);

    let uid = session.init().await.unwrap();

    assert_eq!(uid.map(|u| u.as_str().to_string()).as_deref(), Some("u1"));
    assert_eq!(settled(&session).await, AuthState::User);
    assert_eq!(session.display_name().as_deref(), Some("Mira"));
    assert!(session.has_liked_track(&TrackId::new("t1")));
}

#[tokio::test]
async fn admin_role_settles_as_admin() {
    let store = backend();
    let session = session(&store);
    session.init().await.unwrap();

    session.login("root@example.com", "secret1").await.unwrap();

    assert_eq!(settled(&session).await, AuthState::Admin);
    assert!(session.is_admin());
}

#[tokio::test]
async fn register_writes_profile_document() {
    let store = backend();
    let session = session(&store);

    let uid = session
        .register(Registration {
            display_name: "Noor".to_string(),
            email: "noor@example.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(settled(&session).await, AuthState::User);
    let doc = store.get(&uid.doc_ref()).unwrap();
    assert_eq!(doc.get_str("displayName"), Some("Noor"));
    assert_eq!(doc.get_str("role"), Some("user"));
    assert!(doc.get("imageURL").is_some_and(|v| v.is_null()));
    assert!(doc.get("createdAt").is_some());
    assert_eq!(session.user().map(|u| u.id), Some(uid));
}

#[tokio::test]
async fn provider_errors_carry_their_code() {
    let store = backend();
    let session = session(&store);
    session.init().await.unwrap();

    let err = session.login("mira@example.com", "wrong").await.unwrap_err();
    assert_eq!(err.code(), Some(codes::WRONG_PASSWORD));

    let err = session
        .register(Registration {
            display_name: "Again".to_string(),
            email: "mira@example.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(codes::EMAIL_IN_USE));
    assert_eq!(session.state(), AuthState::Guest);
}

#[tokio::test]
async fn logout_returns_to_guest_and_releases_profile_query() {
    let store = backend();
    let session = session(&store);
    session.login("mira@example.com", "secret1").await.unwrap();
    settled(&session).await;
    assert_eq!(store.watcher_count(), 1);

    session.logout().await.unwrap();

    assert_eq!(session.state(), AuthState::Guest);
    assert!(session.user().is_none());
    assert!(session.user_id().is_none());
    assert_eq!(store.watcher_count(), 0);
    assert!(store.current_user().await.unwrap().is_none());
}

#[tokio::test]
async fn failed_first_profile_push_still_settles() {
    let store = backend();
    let session = session_over(&store, Feed::FailFirstPush);

    session.login("mira@example.com", "secret1").await.unwrap();

    assert_eq!(settled(&session).await, AuthState::User);
    assert!(session.user().is_none());
    assert_eq!(session.user_id().map(|u| u.as_str().to_string()).as_deref(), Some("u1"));
}

#[tokio::test]
async fn overlapping_logins_keep_a_single_profile_query() {
    let store = backend();
    let session = session_over(&store, Feed::Yield);

    let (first, second) = tokio::join!(
        session.login("mira@example.com", "secret1"),
        session.login("root@example.com", "secret1"),
    );
    first.unwrap();
    second.unwrap();
    settled(&session).await;
    assert_eq!(store.watcher_count(), 1);

    session.logout().await.unwrap();
    assert_eq!(store.watcher_count(), 0);

    store
        .update_document(
            &DocRef::new(Collection::Users, "u1"),
            vec![("displayName".to_string(), FieldUpdate::set("Mira V"))],
        )
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(session.state(), AuthState::Guest);
    assert!(session.user().is_none());
}

// ============================================================================
// Profile
// ============================================================================

#[tokio::test]
async fn profile_follows_document_writes() {
    let store = backend();
    let session = session(&store);
    session.login("mira@example.com", "secret1").await.unwrap();
    settled(&session).await;
    let mut user = session.watch_user();

    store
        .update_document(
            &DocRef::new(Collection::Users, "u1"),
            vec![("likedTracks".to_string(), FieldUpdate::array_union("t9"))],
        )
        .await
        .unwrap();

    tokio::time::timeout(
        Duration::from_secs(5),
        user.wait_for(|u| u.as_ref().is_some_and(|u| u.liked_tracks.len() == 2)),
    )
    .await
    .unwrap()
    .unwrap();
    assert!(session.has_liked_track(&TrackId::new("t9")));
}

#[tokio::test]
async fn promotion_to_admin_is_picked_up_live() {
    let store = backend();
    let session = session(&store);
    session.login("mira@example.com", "secret1").await.unwrap();
    settled(&session).await;
    let mut state = session.watch();

    store
        .update_document(
            &DocRef::new(Collection::Users, "u1"),
            vec![("role".to_string(), FieldUpdate::set("admin"))],
        )
        .await
        .unwrap();

    tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s == AuthState::Admin),
    )
    .await
    .unwrap()
    .unwrap();
}

#[tokio::test]
async fn update_profile_writes_only_given_fields() {
    let store = backend();
    let session = session(&store);
    session.login("mira@example.com", "secret1").await.unwrap();
    settled(&session).await;

    session
        .update_profile(ProfileUpdate {
            description: Some("Ambient producer".to_string()),
            social_links: Some(json!({"site": "https://mira.example"})),
            ..ProfileUpdate::default()
        })
        .await
        .unwrap();

    let doc = store.get(&DocRef::new(Collection::Users, "u1")).unwrap();
    assert_eq!(doc.get_str("displayName"), Some("Mira"));
    assert_eq!(doc.get_str("description"), Some("Ambient producer"));
    assert_eq!(doc.to_json()["socialLinks"]["site"], "https://mira.example");
}

#[tokio::test]
async fn avatar_upload_names_blob_after_user() {
    let store = backend();
    let session = session(&store);
    session.login("mira@example.com", "secret1").await.unwrap();

    let url = session.upload_avatar(vec![7; 8]).await.unwrap();

    assert!(url.starts_with("memory://usersAvatars/"));
    assert!(url.ends_with("_u1"));
    assert_eq!(store.blob_count(), 1);
}

#[tokio::test]
async fn profile_writes_need_a_user() {
    let store = backend();
    let session = session(&store);
    session.init().await.unwrap();

    assert!(matches!(
        session.upload_avatar(vec![1]).await,
        Err(SessionError::NotAuthenticated)
    ));
    assert!(matches!(
        session.update_profile(ProfileUpdate::default()).await,
        Err(SessionError::NotAuthenticated)
    ));
}
