//! Auto-capture trigger
//!
//! Watches the playback clock and fires one capture per source when the
//! active track gets close to its end. The owner calls [`AutoCapture::tick`]
//! on a fixed cadence; this type only decides, it never captures.

use crate::types::PlaybackState;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

/// Auto-capture settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoCaptureConfig {
    /// Remaining playtime at or below which a capture fires (default: 60s)
    pub threshold: Duration,

    /// Cadence of the clock check (default: 1s)
    pub tick_interval: Duration,
}

impl Default for AutoCaptureConfig {
    fn default() -> Self {
        Self {
            threshold: Duration::from_secs(60),
            tick_interval: Duration::from_secs(1),
        }
    }
}

/// Permission to run one capture for `src`
///
/// Hand it back to [`AutoCapture::finish`] once the capture resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureTicket {
    src: String,
}

impl CaptureTicket {
    pub fn src(&self) -> &str {
        &self.src
    }
}

/// Once-per-source capture trigger
#[derive(Debug, Default)]
pub struct AutoCapture {
    config: AutoCaptureConfig,

    /// Sources a capture succeeded for; only grows
    captured: HashSet<String>,

    /// Source whose capture is running
    in_flight: Option<String>,

    armed: bool,
}

impl AutoCapture {
    pub fn new(config: AutoCaptureConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &AutoCaptureConfig {
        &self.config
    }

    /// Arm while a track is active, disarm otherwise
    ///
    /// Returns whether the trigger is armed afterwards.
    pub fn sync_armed(&mut self, state: &PlaybackState) -> bool {
        let armed = state.active_track.is_some();
        if armed != self.armed {
            debug!(armed, "Auto-capture trigger toggled");
            self.armed = armed;
        }
        self.armed
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Evaluate one clock sample
    ///
    /// The in-flight guard is taken before returning the ticket, so a second
    /// tick during a slow capture cannot fire again.
    pub fn tick(&mut self, state: &PlaybackState) -> Option<CaptureTicket> {
        if !self.armed || self.in_flight.is_some() || !state.is_playing {
            return None;
        }

        let src = state.active_src()?;
        let remaining = state.remaining_seconds()?;
        if remaining > self.config.threshold.as_secs_f64() || self.captured.contains(src) {
            return None;
        }

        debug!(src = %src, remaining, "Auto-capture firing");
        self.in_flight = Some(src.to_string());
        Some(CaptureTicket {
            src: src.to_string(),
        })
    }

    /// Resolve a ticket
    ///
    /// A successful capture marks the source so it never fires again; a
    /// failed one leaves it unmarked for a later tick. Returns whether the
    /// source is now marked.
    pub fn finish(&mut self, ticket: CaptureTicket, success: bool) -> bool {
        if self.in_flight.as_deref() == Some(ticket.src.as_str()) {
            self.in_flight = None;
        }
        if success {
            self.captured.insert(ticket.src);
            true
        } else {
            debug!(src = %ticket.src, "Auto-capture failed, will retry");
            false
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodify_core::{Track, TrackMetadata};

    fn playing(src: &str, duration: f64, position: f64) -> PlaybackState {
        PlaybackState {
            active_track: Some(Track::new(TrackMetadata::new("Song"), src)),
            is_playing: true,
            duration_seconds: duration,
            position_seconds: position,
        }
    }

    #[test]
    fn idle_state_disarms() {
        let mut trigger = AutoCapture::default();
        assert!(!trigger.sync_armed(&PlaybackState::idle()));
        assert!(trigger.tick(&PlaybackState::idle()).is_none());
    }

    #[test]
    fn fires_within_threshold_only() {
        let mut trigger = AutoCapture::default();
        let far = playing("a", 200.0, 100.0);
        trigger.sync_armed(&far);
        assert!(trigger.tick(&far).is_none());

        let near = playing("a", 200.0, 140.0);
        let ticket = trigger.tick(&near).unwrap();
        assert_eq!(ticket.src(), "a");
    }

    #[test]
    fn unknown_clock_is_a_no_op() {
        let mut trigger = AutoCapture::default();
        let state = playing("a", f64::NAN, 10.0);
        trigger.sync_armed(&state);
        assert!(trigger.tick(&state).is_none());

        let live_stream = playing("a", f64::INFINITY, 10.0);
        assert!(trigger.tick(&live_stream).is_none());
    }

    #[test]
    fn paused_track_does_not_fire() {
        let mut trigger = AutoCapture::default();
        let mut state = playing("a", 100.0, 90.0);
        state.is_playing = false;
        trigger.sync_armed(&state);
        assert!(trigger.tick(&state).is_none());
    }

    #[test]
    fn in_flight_blocks_second_tick() {
        let mut trigger = AutoCapture::default();
        let state = playing("a", 100.0, 90.0);
        trigger.sync_armed(&state);

        let ticket = trigger.tick(&state).unwrap();
        assert!(trigger.tick(&state).is_none());

        assert!(trigger.finish(ticket, true));
        assert!(trigger.tick(&state).is_none());
        assert!(trigger.captured.contains("a"));
    }

    #[test]
    fn failure_leaves_source_unmarked() {
        let mut trigger = AutoCapture::default();
        let state = playing("a", 100.0, 90.0);
        trigger.sync_armed(&state);

        let ticket = trigger.tick(&state).unwrap();
        assert!(!trigger.finish(ticket, false));
        assert!(!trigger.captured.contains("a"));
        assert!(trigger.tick(&state).is_some());
    }
}
