//! Lyra Catalog
//!
//! Catalog operations over the abstract backend: tracks, albums, artists,
//! comments, reports, chats and likes.
//!
//! # Architecture
//!
//! - **Resolver**: stored documents hold references; [`Resolver`] replaces
//!   them with the referenced data following a declarative [`Shape`]
//! - **Vertical Slicing**: each feature module owns its queries and writes
//! - **Live chats**: [`ChatSynchronizer`] keeps a resolved chat list current
//!
//! # Example
//!
//! ```rust,no_run
//! use lyra_catalog::Catalog;
//! use lyra_core::types::AlbumId;
//! use lyra_storage::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> lyra_core::Result<()> {
//! let store = MemoryStore::new();
//! let catalog = Catalog::new(Arc::new(store.clone()), Arc::new(store));
//!
//! if let Some(album) = catalog.get_album_by_id(&AlbumId::new("a1")).await? {
//!     println!("{} ({} tracks)", album.title, album.tracks.len());
//! }
//! # Ok(())
//! # }
//! ```

mod catalog;
pub mod resolver;
mod shapes;
pub mod sync;

// Vertical slices
pub mod albums;
pub mod artists;
pub mod chats;
pub mod comments;
pub mod likes;
pub mod reports;
pub mod tracks;

pub use catalog::Catalog;
pub use likes::LikeKind;
pub use resolver::{Resolver, Shape};
pub use sync::{ChatSynchronizer, ChatView, SyncState};
