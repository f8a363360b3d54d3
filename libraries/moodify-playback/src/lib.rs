//! Moodify - Playback Orchestration
//!
//! Platform-agnostic playback state for Moodify.
//!
//! This crate provides:
//! - Play-now-or-enqueue submission policy
//! - FIFO queue of upcoming tracks
//! - Bounded playback history (newest first) with navigation
//! - Locally-owned audio handles and their release
//! - Unsupported-format fallback bookkeeping
//! - Once-per-source auto-capture trigger driven by the playback clock
//!
//! # Architecture
//!
//! `moodify-playback` does no I/O and owns no timers. The
//! [`PlaybackController`] records what changed as [`PlaybackEvent`]s; the
//! session that owns it drains them and drives the player widget, the
//! settle delay and the capture cadence.
//!
//! # Example
//!
//! ```rust
//! use moodify_core::{Track, TrackMetadata};
//! use moodify_playback::{PlaybackController, PlaybackConfig, SubmitOutcome};
//!
//! let mut controller = PlaybackController::new(PlaybackConfig::default());
//!
//! let first = Track::new(TrackMetadata::new("First"), "https://cdn.example.com/1.mp3");
//! let second = Track::new(TrackMetadata::new("Second"), "https://cdn.example.com/2.mp3");
//!
//! assert_eq!(controller.submit(first), SubmitOutcome::Activated);
//! assert_eq!(controller.submit(second), SubmitOutcome::Queued(0));
//!
//! // The player finished the first track
//! controller.on_playback_ended("https://cdn.example.com/1.mp3");
//! assert_eq!(controller.state().active_src(), Some("https://cdn.example.com/2.mp3"));
//! assert_eq!(controller.history().len(), 2);
//! ```

#![forbid(unsafe_code)]

pub mod autocapture;
pub mod controller;
pub mod error;
pub mod events;
pub mod handles;
pub mod history;
pub mod queue;
pub mod types;

pub use autocapture::{AutoCapture, AutoCaptureConfig, CaptureTicket};
pub use controller::{FallbackRequest, PlaybackController};
pub use error::{PlaybackError, Result};
pub use events::{PlayStart, PlaybackEvent};
pub use handles::HandleStore;
pub use history::History;
pub use queue::Queue;
pub use types::{PlaybackConfig, PlaybackState, SubmitOutcome};
