//! Lyra Core
//!
//! Document model, typed entities and backend traits shared by every Lyra crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Document model**: [`DocRef`], [`Value`], [`Document`] and the minimal
//!   query/update vocabulary understood by backends
//! - **Entities**: `Track`, `Album`, `Artist`, `Chat`, `Message`, `Comment`,
//!   `Report`, `User`, decoded from resolved aggregates
//! - **Backend traits**: [`DocumentStore`], [`BlobStore`], [`AuthProvider`],
//!   plus [`AudioOutput`] and [`TrackLoader`] for playback
//! - **Error handling**: unified [`LyraError`] and [`Result`] types
//!
//! # Example
//!
//! ```rust
//! use lyra_core::types::{Collection, DocRef, TrackId};
//!
//! let track = TrackId::new("t1");
//! assert_eq!(track.doc_ref(), DocRef::new(Collection::Tracks, "t1"));
//! assert_eq!(track.doc_ref().path(), "tracks/t1");
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod storage;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{LyraError, Result};
pub use storage::{DocumentStore, SnapshotMessage, Subscription};
pub use traits::{AudioOutput, AuthProvider, BlobStore, TrackLoader};

pub use types::{
    // Document model
    Collection, DocRef, Document, Fields, Value,
    // Queries
    Direction, FieldUpdate, Filter, Query, Updates, WriteBatch,
    // Ids
    AlbumId, ChatId, CommentId, MessageId, ReportId, TrackId, UserId,
    // Entities
    Album, AlbumSummary, Artist, Chat, Comment, Link, Message, Report, Track, User,
};
