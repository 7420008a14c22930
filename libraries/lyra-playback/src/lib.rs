//! Lyra - Playback Management
//!
//! This crate provides:
//! - An ordered track queue with a cursor, replaced per playback context
//! - Loop modes (Off, LoopAll, LoopOne) with queue-relative navigation
//! - Volume control (0.0-1.0, mute with exact restore)
//! - Playback events and point-in-time snapshots for UI synchronization
//!
//! # Architecture
//!
//! [`PlaybackManager`] is a synchronous state machine with no I/O.
//! [`PlaybackEngine`] drives it: it looks tracks up through a
//! [`TrackLoader`](lyra_core::TrackLoader), starts them on an
//! [`AudioOutput`](lyra_core::AudioOutput), and publishes the results.
//!
//! # Example: Loop rule
//!
//! ```rust
//! use lyra_playback::LoopMode;
//!
//! // Three tracks, cursor on the last one
//! assert_eq!(LoopMode::Off.next_index(2, 3), None);
//! assert_eq!(LoopMode::LoopAll.next_index(2, 3), Some(0));
//! assert_eq!(LoopMode::LoopOne.next_index(2, 3), Some(2));
//! ```

mod engine;
mod error;
pub mod events;
mod manager;
mod queue;
pub mod types;
mod volume;

// Public exports
pub use engine::PlaybackEngine;
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use manager::PlaybackManager;
pub use queue::Queue;
pub use types::{LoopMode, PlaybackConfig, PlaybackState, PlayerSnapshot};
pub use volume::Volume;
