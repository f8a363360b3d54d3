//! Moodify Core
//!
//! Platform-agnostic core types, traits, and error handling for Moodify.
//!
//! This crate provides the building blocks shared by the playback, tint and
//! client crates as well as the application that wires them together.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackMetadata`, `HistoryEntry`, `MediaSource`
//! - **Collaborator Traits**: `CaptureDevice` (camera), `PlayerWidget` (audio element)
//! - **Player Notifications**: what a player widget reports back to the session
//! - **Error Handling**: `MoodifyError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use moodify_core::{Track, TrackMetadata};
//!
//! let metadata = TrackMetadata::new("Sandstorm")
//!     .with_artist("Darude")
//!     .with_album("Before the Storm");
//!
//! let track = Track::new(metadata, "https://cdn.example.com/sandstorm.mp3");
//! assert_eq!(track.title(), "Sandstorm");
//! assert!(!track.is_local());
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{MoodifyError, Result};
pub use traits::{CaptureDevice, PlayerWidget};
pub use types::{
    is_audio_mime, HistoryEntry, MediaSource, PlayerErrorKind, PlayerNotification, Track,
    TrackMetadata, LOCAL_SCHEME,
};
