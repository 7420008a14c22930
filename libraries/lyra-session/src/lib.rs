//! Lyra Session
//!
//! Client-side session state, each piece an owned store publishing through
//! `tokio::sync::watch`:
//!
//! - [`AuthSession`]: sign-in lifecycle and the live profile of the current user
//! - [`ThemeStore`]: dark/light theme saved through [`Preferences`]
//! - [`MessageStore`]: short-lived toast messages
//! - [`ModalStore`]: the single open dialog
//!
//! # Example
//!
//! ```rust,no_run
//! use lyra_session::{AuthSession, AuthState};
//! use lyra_storage::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> lyra_session::Result<()> {
//! let backend = Arc::new(MemoryStore::new());
//! let session = AuthSession::new(backend.clone(), backend.clone(), backend);
//!
//! session.init().await?;
//! if session.wait_until_settled().await == AuthState::Guest {
//!     session.login("mira@example.com", "secret1").await?;
//! }
//! # Ok(())
//! # }
//! ```

mod auth;
mod error;
mod message;
mod modal;
mod theme;

pub use auth::{AuthSession, AuthState, Registration};
pub use error::{Result, SessionError};
pub use message::{MessageStore, Toast, TOAST_DURATION};
pub use modal::{Modal, ModalStore};
pub use theme::{
    FilePreferences, MemoryPreferences, Preferences, Theme, ThemeStore, THEME_CHANGED, THEME_KEY,
};
