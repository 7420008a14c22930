//! Lyra headless client
//!
//! Drives the Lyra libraries against a seeded in-memory backend: catalog
//! browsing, playback through a simulated output, live chats and the session
//! stores.
//!
//! This library exposes the command implementations for testing purposes.

pub mod commands;
pub mod config;
pub mod error;
pub mod output;

// Re-export commonly used types for convenience
pub use commands::{App, OutgoingMessage, PlayRequest};
pub use config::LyraConfig;
pub use error::{CliError, Result};
pub use output::SimulatedOutput;
