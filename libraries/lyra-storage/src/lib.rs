//! Lyra in-memory backend
//!
//! [`MemoryStore`] implements every backend trait of `lyra-core`
//! ([`DocumentStore`](lyra_core::DocumentStore), [`BlobStore`](lyra_core::BlobStore),
//! [`AuthProvider`](lyra_core::AuthProvider)) on in-process state. It backs the
//! headless client and serves as the test double for every other crate.
//!
//! Live queries are re-evaluated on every write and pushed as full snapshots
//! tagged with a store-wide sequence number.

#![forbid(unsafe_code)]

pub mod auth;
pub mod blobs;
pub mod fixture;
mod store;
mod updates;

pub use blobs::BLOB_SCHEME;
pub use store::MemoryStore;
