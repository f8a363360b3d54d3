//! Moodify
//!
//! Wires the playback, tint and inference crates into a running session:
//! a photo goes to the mood-inference API, the returned track plays (or
//! queues), and the UI is themed after the playing artwork.
//!
//! This library exposes the session and its adapters for the binary and
//! for integration tests.

pub mod artwork;
pub mod config;
pub mod console;
pub mod devices;
pub mod error;
pub mod services;
pub mod session;

pub use config::MoodifyConfig;
pub use error::{AppError, Result};
pub use services::InferenceService;
pub use session::{
    Session, SessionCommand, SessionConfig, SessionDeps, SessionHandle, SessionNotice,
    SessionSnapshot,
};
