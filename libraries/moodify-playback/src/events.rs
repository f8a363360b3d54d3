//! Playback Events
//!
//! The controller never calls the player widget itself. It records what
//! happened as events, and the session drains them after every mutation to
//! drive the widget, re-arm timers and notify the UI.

use moodify_core::Track;
use serde::{Deserialize, Serialize};

/// When the session should issue "play" for a freshly activated track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayStart {
    /// After the settle delay (direct submission, user navigation)
    AfterSettle,

    /// Once the widget reports the source ready (queue advancement)
    OnReady,

    /// Load only and wait for an explicit resume (startup track)
    Paused,
}

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// A track entered the "now playing" slot
    ///
    /// The session loads it into the player and issues play once the
    /// settle delay elapsed or the widget reported ready.
    TrackActivated {
        /// The new active track
        track: Track,
        /// Whether a history entry was appended for it
        recorded: bool,
        /// When to start playback
        start: PlayStart,
    },

    /// The widget reported new artwork for the active track
    TrackUpdated {
        /// The active track with its new cover
        track: Track,
    },

    /// A track was appended to the queue
    TrackQueued {
        /// The queued track
        track: Track,
        /// Its position in the queue
        position: usize,
    },

    /// Queue changed (tracks added/removed/promoted)
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// The active track ended and nothing was queued
    Idle {
        /// Source of the finished track, still displayed
        src: String,
    },

    /// A locally-owned handle was released
    HandleReleased {
        /// The released URI
        uri: String,
    },

    /// Error the user should see
    Error {
        /// Error message
        message: String,
    },
}
