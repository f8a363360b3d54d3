//! Core types for playback management

use moodify_core::Track;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Live playback state
///
/// Exactly one exists per session, owned by the
/// [`PlaybackController`](crate::PlaybackController). Everything else reads
/// snapshots of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Track loaded into the player, playing or not
    pub active_track: Option<Track>,

    /// Whether audio is currently playing
    pub is_playing: bool,

    /// Duration of the active track (`NaN` while unknown)
    pub duration_seconds: f64,

    /// Position in the active track (`NaN` while unknown)
    pub position_seconds: f64,
}

impl PlaybackState {
    /// The idle state before anything was loaded
    pub fn idle() -> Self {
        Self {
            active_track: None,
            is_playing: false,
            duration_seconds: f64::NAN,
            position_seconds: f64::NAN,
        }
    }

    /// Source of the active track
    pub fn active_src(&self) -> Option<&str> {
        self.active_track.as_ref().map(Track::src)
    }

    /// Seconds left in the active track, if both clock values are known
    pub fn remaining_seconds(&self) -> Option<f64> {
        let duration = self.duration_seconds;
        let position = self.position_seconds;
        if !duration.is_finite() || duration <= 0.0 || !position.is_finite() {
            return None;
        }
        Some(duration - position)
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::idle()
    }
}

/// Result of handing a track to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitOutcome {
    /// The track became the active track
    Activated,

    /// The track was appended to the queue at this position
    Queued(usize),
}

/// Configuration for the playback controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Maximum history size (default: 20)
    pub history_size: usize,

    /// Delay between loading a source and issuing play (default: 120ms)
    pub settle_delay: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            history_size: 20,
            settle_delay: Duration::from_millis(120),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.history_size, 20);
        assert_eq!(config.settle_delay, Duration::from_millis(120));
    }

    #[test]
    fn remaining_requires_known_clock() {
        let mut state = PlaybackState::idle();
        assert_eq!(state.remaining_seconds(), None);

        state.duration_seconds = 200.0;
        assert_eq!(state.remaining_seconds(), None);

        state.position_seconds = 150.0;
        assert_eq!(state.remaining_seconds(), Some(50.0));

        state.duration_seconds = f64::INFINITY;
        assert_eq!(state.remaining_seconds(), None);

        state.duration_seconds = 0.0;
        assert_eq!(state.remaining_seconds(), None);
    }
}
