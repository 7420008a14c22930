//! Signed-in user session
//!
//! [`AuthSession`] ties the auth provider to the user's profile document. Once
//! a user is signed in, a standing query on their `users/{uid}` document keeps
//! the cached profile (role, likes, avatar) current.

use lyra_core::fields;
use lyra_core::types::{
    Collection, FieldUpdate, Filter, ProfileUpdate, Query, TrackId, Updates, User, UserId, Value,
};
use lyra_core::{AuthProvider, BlobStore, DocumentStore, SnapshotMessage, Subscription};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, SessionError};

/// Where the session is in its sign-in lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// The provider has not been asked yet
    Unknown,
    /// Signed in, profile document not loaded yet
    LoadingUser,
    Guest,
    User,
    Admin,
}

impl AuthState {
    /// Whether guards can decide on this state
    pub fn is_settled(self) -> bool {
        matches!(self, AuthState::Guest | AuthState::User | AuthState::Admin)
    }

    pub fn is_signed_in(self) -> bool {
        matches!(
            self,
            AuthState::LoadingUser | AuthState::User | AuthState::Admin
        )
    }
}

/// Sign-up form
#[derive(Debug, Clone)]
pub struct Registration {
    pub display_name: String,
    pub email: String,
    pub password: String,
}

pub struct AuthSession {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    state: Arc<watch::Sender<AuthState>>,
    user: Arc<watch::Sender<Option<User>>>,
    uid: Mutex<Option<UserId>>,
    /// Profile follower; held across attach and reset so they never overlap
    task: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl AuthSession {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::Unknown);
        let (user, _) = watch::channel(None);
        Self {
            auth,
            store,
            blobs,
            state: Arc::new(state),
            user: Arc::new(user),
            uid: Mutex::new(None),
            task: tokio::sync::Mutex::new(None),
        }
    }

    // ===== Lifecycle =====

    /// Ask the provider who is signed in and start following their profile
    pub async fn init(&self) -> Result<Option<UserId>> {
        self.state.send_replace(AuthState::Unknown);
        match self.auth.current_user().await? {
            Some(uid) => {
                self.attach(uid.clone()).await?;
                Ok(Some(uid))
            }
            None => {
                self.reset().await;
                Ok(None)
            }
        }
    }

    /// Create an account, write its profile document and sign it in
    pub async fn register(&self, registration: Registration) -> Result<UserId> {
        let uid = self
            .auth
            .sign_up(&registration.email, &registration.password)
            .await?;

        self.store
            .set_document(
                &uid.doc_ref(),
                fields! {
                    "displayName" => registration.display_name.as_str(),
                    "imageURL" => Value::Null,
                    "role" => "user",
                    "createdAt" => Value::ServerTimestamp,
                },
            )
            .await?;
        info!(uid = %uid, "User registered");

        self.attach(uid.clone()).await?;
        Ok(uid)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserId> {
        let uid = self.auth.sign_in(email, password).await?;
        self.attach(uid.clone()).await?;
        Ok(uid)
    }

    pub async fn logout(&self) -> Result<()> {
        self.auth.sign_out().await?;
        self.reset().await;
        info!("Signed out");
        Ok(())
    }

    /// Wait until the session is `Guest`, `User` or `Admin`
    pub async fn wait_until_settled(&self) -> AuthState {
        let mut rx = self.state.subscribe();
        // The sender lives in `self`, so the channel cannot close here
        let settled = match rx.wait_for(|state| state.is_settled()).await {
            Ok(state) => *state,
            Err(_) => self.state(),
        };
        settled
    }

    // ===== Profile =====

    /// Apply the set fields of `update` to the signed-in user's document
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<()> {
        let uid = self.require_uid()?;

        let mut changes: Updates = Vec::new();
        if let Some(name) = update.display_name {
            changes.push(("displayName".to_string(), FieldUpdate::set(name)));
        }
        if let Some(url) = update.image_url {
            changes.push(("imageURL".to_string(), FieldUpdate::set(url)));
        }
        if let Some(description) = update.description {
            changes.push(("description".to_string(), FieldUpdate::set(description)));
        }
        if let Some(links) = update.social_links {
            changes.push((
                "socialLinks".to_string(),
                FieldUpdate::Set(Value::from_json(links)),
            ));
        }
        if changes.is_empty() {
            return Ok(());
        }

        self.store.update_document(&uid.doc_ref(), changes).await?;
        debug!(uid = %uid, "Profile updated");
        Ok(())
    }

    /// Upload a new avatar and return its URL
    ///
    /// The profile is not changed; pass the URL to [`update_profile`](Self::update_profile).
    pub async fn upload_avatar(&self, bytes: Vec<u8>) -> Result<String> {
        let uid = self.require_uid()?;
        let path = format!("usersAvatars/{}_{}", Uuid::new_v4(), uid);
        let url = self.blobs.upload_blob(&path, bytes).await?;
        debug!(uid = %uid, url = %url, "Avatar uploaded");
        Ok(url)
    }

    // ===== Accessors =====

    pub fn state(&self) -> AuthState {
        *self.state.borrow()
    }

    pub fn watch(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn watch_user(&self) -> watch::Receiver<Option<User>> {
        self.user.subscribe()
    }

    /// Cached profile of the signed-in user
    pub fn user(&self) -> Option<User> {
        self.user.borrow().clone()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.uid.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_signed_in()
    }

    pub fn is_admin(&self) -> bool {
        self.state() == AuthState::Admin
    }

    pub fn display_name(&self) -> Option<String> {
        self.user.borrow().as_ref().map(|u| u.display_name.clone())
    }

    pub fn avatar_url(&self) -> Option<String> {
        self.user.borrow().as_ref().and_then(|u| u.image_url.clone())
    }

    pub fn has_liked_track(&self, id: &TrackId) -> bool {
        self.user
            .borrow()
            .as_ref()
            .is_some_and(|u| u.has_liked_track(id))
    }

    // ===== Internals =====

    fn require_uid(&self) -> Result<UserId> {
        self.user_id().ok_or(SessionError::NotAuthenticated)
    }

    /// Follow `uid`'s profile document
    async fn attach(&self, uid: UserId) -> Result<()> {
        let mut task = self.task.lock().await;
        Self::detach(&mut task).await;
        *self.uid.lock().unwrap_or_else(PoisonError::into_inner) = Some(uid.clone());
        self.state.send_replace(AuthState::LoadingUser);

        let query = Query::all().filter(Filter::IdIn(vec![uid.as_str().to_string()]));
        let subscription = match self.store.subscribe(Collection::Users, query).await {
            Ok(subscription) => subscription,
            Err(e) => {
                warn!(uid = %uid, error = %e, "Profile subscription failed; signing out");
                if let Err(e) = self.auth.sign_out().await {
                    warn!(error = %e, "Sign-out after failed subscription also failed");
                }
                self.clear();
                return Err(e.into());
            }
        };

        let state = Arc::clone(&self.state);
        let user = Arc::clone(&self.user);
        *task = Some(tokio::spawn(async move {
            Self::follow_profile(uid, subscription, &state, &user).await;
        }));
        Ok(())
    }

    async fn detach(task: &mut Option<JoinHandle<()>>) {
        if let Some(handle) = task.take() {
            handle.abort();
            let _ = handle.await;
        }
    }

    /// Back to a signed-out guest
    async fn reset(&self) {
        let mut task = self.task.lock().await;
        Self::detach(&mut task).await;
        self.clear();
    }

    fn clear(&self) {
        *self.uid.lock().unwrap_or_else(PoisonError::into_inner) = None;
        self.user.send_replace(None);
        self.state.send_replace(AuthState::Guest);
    }

    async fn follow_profile(
        uid: UserId,
        mut subscription: Subscription,
        state: &watch::Sender<AuthState>,
        user: &watch::Sender<Option<User>>,
    ) {
        while let Some(message) = subscription.next().await {
            let documents = match message {
                SnapshotMessage::Snapshot { documents, .. } => documents,
                SnapshotMessage::Error(e) => {
                    warn!(uid = %uid, error = %e, "Profile push failed; keeping cached profile");
                    settle_loading(state);
                    continue;
                }
            };

            let Some(doc) = documents.into_iter().next() else {
                // Signed in without a profile document
                warn!(uid = %uid, "Profile document missing");
                user.send_replace(None);
                state.send_replace(AuthState::User);
                continue;
            };

            match serde_json::from_value::<User>(doc.to_json()) {
                Ok(profile) => {
                    let next = if profile.is_admin() {
                        AuthState::Admin
                    } else {
                        AuthState::User
                    };
                    debug!(uid = %uid, state = ?next, "Profile refreshed");
                    user.send_replace(Some(profile));
                    state.send_replace(next);
                }
                Err(e) => {
                    warn!(uid = %uid, error = %e, "Malformed profile document");
                    settle_loading(state);
                }
            }
        }
    }
}

/// Settle a fresh sign-in as a plain user when no profile could be read
fn settle_loading(state: &watch::Sender<AuthState>) {
    state.send_if_modified(|state| {
        let loading = *state == AuthState::LoadingUser;
        if loading {
            *state = AuthState::User;
        }
        loading
    });
}

impl Drop for AuthSession {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}
