//! Playback controller - core orchestration
//!
//! Owns the active track, the queue, the history and the local handle store,
//! and applies the play-now-or-enqueue policy. All mutations go through
//! `&mut self`, so submission, end-of-track advancement and the format
//! fallback can never interleave.

use crate::{
    error::{PlaybackError, Result},
    events::{PlayStart, PlaybackEvent},
    handles::HandleStore,
    history::History,
    queue::Queue,
    types::{PlaybackConfig, PlaybackState, SubmitOutcome},
};
use bytes::Bytes;
use moodify_core::{is_audio_mime, MediaSource, PlayerErrorKind, Track, TrackMetadata};
use tracing::{debug, info, warn};

/// Re-fetch needed because the player cannot decode a remote source
///
/// The session downloads `track.src()` as raw bytes and hands them back via
/// [`PlaybackController::complete_fallback`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackRequest {
    /// The active track at the time the player failed
    pub track: Track,
}

impl FallbackRequest {
    /// Remote source to re-fetch
    pub fn src(&self) -> &str {
        self.track.src()
    }
}

/// Playback controller
///
/// Platform-agnostic: it never touches the player widget. Every state change
/// is reported as a [`PlaybackEvent`] which the owner drains and acts on.
pub struct PlaybackController {
    state: PlaybackState,
    queue: Queue,
    history: History,
    handles: HandleStore,
    config: PlaybackConfig,

    /// Source activated but not yet confirmed playing
    pending_play: Option<String>,

    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackController {
    /// Create new controller
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            state: PlaybackState::idle(),
            queue: Queue::new(),
            history: History::new(config.history_size),
            handles: HandleStore::new(),
            config,
            pending_play: None,
            pending_events: Vec::new(),
        }
    }

    // ===== Submission =====

    /// Play a track now if nothing is playing, otherwise enqueue it
    ///
    /// A track that was activated but has not started yet counts as
    /// playing. Every submission is kept: a source that is already active
    /// or queued gets its own queue entry and plays again.
    pub fn submit(&mut self, track: Track) -> SubmitOutcome {
        if self.is_busy() {
            let position = self.queue.enqueue(track.clone());
            info!(title = %track.title(), position, "Queued track");
            self.pending_events
                .push(PlaybackEvent::TrackQueued { track, position });
            self.emit_queue_changed();
            SubmitOutcome::Queued(position)
        } else {
            self.activate(track, true, PlayStart::AfterSettle);
            SubmitOutcome::Activated
        }
    }

    /// Wrap raw audio bytes in a local handle and submit them
    pub fn submit_local(
        &mut self,
        metadata: TrackMetadata,
        bytes: Bytes,
        mime: &str,
    ) -> Result<SubmitOutcome> {
        if !is_audio_mime(mime) {
            return Err(PlaybackError::NotAudio(mime.to_string()));
        }
        let uri = self.handles.create(bytes, mime);
        Ok(self.submit(Track::new(metadata, uri)))
    }

    /// Show `track` as the active track without playing it
    ///
    /// Used for the startup track. It is recorded in the history and loaded
    /// paused; the next submission replaces it since nothing is playing.
    /// Returns false when a track is already active.
    pub fn preload(&mut self, track: Track) -> bool {
        if self.state.active_track.is_some() {
            debug!(src = %track.src(), "Ignoring preload, a track is already active");
            return false;
        }
        self.activate(track, true, PlayStart::Paused);
        true
    }

    // ===== Player notifications =====

    /// The player finished `src`
    ///
    /// Returns false when the notification belongs to a superseded source
    /// and was ignored. Otherwise the queue head (if any) becomes active and
    /// plays once the widget reports ready; with an empty queue the finished
    /// track stays displayed but stopped.
    pub fn on_playback_ended(&mut self, src: &str) -> bool {
        if self.state.active_src() != Some(src) {
            debug!(src = %src, "Ignoring ended notification for inactive source");
            return false;
        }

        self.state.is_playing = false;
        self.pending_play = None;

        match self.queue.dequeue_head() {
            Some(next) => {
                info!(title = %next.title(), "Advancing to queued track");
                self.emit_queue_changed();
                self.activate(next, true, PlayStart::OnReady);
            }
            None => {
                debug!(src = %src, "Queue empty, playback idle");
                self.pending_events.push(PlaybackEvent::Idle {
                    src: src.to_string(),
                });
            }
        }
        true
    }

    /// Whether play should be issued for `src` now
    pub fn should_play(&self, src: &str) -> bool {
        self.pending_play.as_deref() == Some(src)
    }

    /// The player reported `src` as playing
    pub fn mark_playing(&mut self, src: &str) {
        if self.state.active_src() != Some(src) {
            return;
        }
        self.state.is_playing = true;
        self.pending_play = None;
    }

    /// The player reported `src` as paused
    pub fn mark_paused(&mut self, src: &str) {
        if self.state.active_src() != Some(src) {
            return;
        }
        self.state.is_playing = false;
        self.pending_play = None;
    }

    /// Record the latest clock poll of the player
    pub fn observe_clock(&mut self, is_playing: bool, duration: f64, position: f64) {
        if self.state.active_track.is_none() {
            return;
        }
        if is_playing {
            self.pending_play = None;
        }
        self.state.is_playing = is_playing;
        self.state.duration_seconds = duration;
        self.state.position_seconds = position;
    }

    /// The widget reported new artwork for the active track
    ///
    /// Blank or unchanged covers are ignored. Returns the updated track.
    pub fn update_cover(&mut self, cover: &str) -> Option<Track> {
        let cover = cover.trim();
        if cover.is_empty() {
            return None;
        }
        let active = self.state.active_track.as_ref()?;
        if active.cover() == Some(cover) {
            return None;
        }

        let track = active.with_cover(cover);
        debug!(src = %track.src(), cover = %cover, "Active artwork changed");
        self.state.active_track = Some(track.clone());
        self.pending_events.push(PlaybackEvent::TrackUpdated {
            track: track.clone(),
        });
        Some(track)
    }

    /// The player failed on `src`
    ///
    /// A remote source in an unsupported format yields a
    /// [`FallbackRequest`]; a local source gets no further fallback and the
    /// failure is reported as an error event.
    pub fn on_player_error(&mut self, src: &str, kind: PlayerErrorKind) -> Option<FallbackRequest> {
        let active = self.state.active_track.clone()?;
        if active.src() != src {
            debug!(src = %src, "Ignoring error for inactive source");
            return None;
        }

        self.state.is_playing = false;
        self.pending_play = None;

        match kind {
            PlayerErrorKind::UnsupportedFormat if !active.is_local() => {
                info!(src = %src, "Unsupported format, re-fetching as raw bytes");
                Some(FallbackRequest { track: active })
            }
            PlayerErrorKind::UnsupportedFormat => {
                warn!(src = %src, "Local source unsupported, no further fallback");
                self.emit_error("Unable to play this audio format");
                None
            }
            PlayerErrorKind::Other(message) => {
                warn!(src = %src, error = %message, "Playback failed");
                self.emit_error(message);
                None
            }
        }
    }

    /// Finish a fallback with the re-fetched bytes
    ///
    /// Returns `Ok(None)` when the active track changed while the fetch was
    /// in flight; the bytes are dropped without creating a handle.
    pub fn complete_fallback(
        &mut self,
        request: &FallbackRequest,
        bytes: Bytes,
        mime: &str,
    ) -> Result<Option<SubmitOutcome>> {
        if self.state.active_src() != Some(request.src()) {
            debug!(src = %request.src(), "Discarding stale fallback result");
            return Ok(None);
        }
        if !is_audio_mime(mime) {
            return Err(PlaybackError::NotAudio(mime.to_string()));
        }

        let uri = self.handles.create(bytes, mime);
        Ok(Some(self.submit(request.track.with_src(uri))))
    }

    /// Report a failed fallback fetch, unless it went stale
    pub fn fail_fallback(&mut self, request: &FallbackRequest, message: impl Into<String>) {
        if self.state.active_src() == Some(request.src()) {
            self.emit_error(message);
        }
    }

    // ===== Queue and history navigation =====

    /// Promote the queue entry at `index` and play it now
    pub fn play_from_queue(&mut self, index: usize) -> Result<Track> {
        let track = self
            .queue
            .play_now(index)
            .ok_or(PlaybackError::IndexOutOfBounds(index))?;
        self.emit_queue_changed();
        self.activate(track.clone(), true, PlayStart::AfterSettle);
        Ok(track)
    }

    /// Discard the queue entry at `index`
    pub fn remove_from_queue(&mut self, index: usize) -> Result<Track> {
        let track = self
            .queue
            .remove(index)
            .ok_or(PlaybackError::IndexOutOfBounds(index))?;
        self.emit_queue_changed();
        self.retire(&track);
        Ok(track)
    }

    /// Re-activate the history entry at `index` without recording it again
    pub fn play_from_history(&mut self, index: usize) -> Result<Track> {
        let track = self
            .history
            .get(index)
            .map(|entry| entry.track.clone())
            .ok_or(PlaybackError::IndexOutOfBounds(index))?;

        if track.is_local() && !self.handles.is_live(track.src()) {
            return Err(PlaybackError::HandleReleased(track.src().to_string()));
        }

        self.activate(track.clone(), false, PlayStart::AfterSettle);
        Ok(track)
    }

    /// Step to the next older history entry
    ///
    /// Returns `Ok(None)` when there is nothing older, or the active track
    /// is not in the history.
    pub fn play_previous(&mut self) -> Result<Option<Track>> {
        let Some(current) = self.history_index_of_active()? else {
            return Ok(None);
        };
        let target = (current + 1).min(self.history.len().saturating_sub(1));
        if target == current {
            return Ok(None);
        }
        self.play_from_history(target).map(Some)
    }

    /// Step to the next newer history entry
    pub fn play_next(&mut self) -> Result<Option<Track>> {
        let current = self.history_index_of_active()?;
        match current {
            Some(current) if current > 0 => self.play_from_history(current - 1).map(Some),
            _ => Ok(None),
        }
    }

    // ===== Sources =====

    /// Turn a track into something the player can load
    pub fn resolve_source(&self, track: &Track) -> Result<MediaSource> {
        if track.is_local() {
            self.handles.resolve(track.src())
        } else {
            Ok(MediaSource::Remote(track.src().to_string()))
        }
    }

    /// Release every local handle (session teardown)
    pub fn shutdown(&mut self) {
        let released = self.handles.release_all();
        if released > 0 {
            debug!(released, "Released local handles on shutdown");
        }
    }

    // ===== Accessors =====

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn handles(&self) -> &HandleStore {
        &self.handles
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Whether a track is playing or about to
    pub fn is_busy(&self) -> bool {
        self.state.is_playing || self.pending_play.is_some()
    }

    /// Drain events for the owner to act on
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internals =====

    fn activate(&mut self, track: Track, record: bool, start: PlayStart) {
        let previous = self.state.active_track.replace(track.clone());
        self.state.is_playing = false;
        self.state.duration_seconds = f64::NAN;
        self.state.position_seconds = f64::NAN;
        self.pending_play = match start {
            PlayStart::Paused => None,
            PlayStart::AfterSettle | PlayStart::OnReady => Some(track.src().to_string()),
        };

        if record {
            self.history.record(track.clone());
        }

        info!(title = %track.title(), src = %track.src(), "Now playing");
        self.pending_events.push(PlaybackEvent::TrackActivated {
            track: track.clone(),
            recorded: record,
            start,
        });

        if let Some(previous) = previous {
            if previous.src() != track.src() {
                self.retire(&previous);
            }
        }
    }

    /// Release the handle of a track that is no longer active or queued
    fn retire(&mut self, track: &Track) {
        if !track.is_local() {
            return;
        }
        let src = track.src();
        if self.state.active_src() == Some(src) || self.queue.contains_src(src) {
            return;
        }
        match self.handles.release(src) {
            Ok(()) => self.pending_events.push(PlaybackEvent::HandleReleased {
                uri: src.to_string(),
            }),
            Err(e) => debug!(error = %e, "Ignoring handle release failure"),
        }
    }

    fn history_index_of_active(&self) -> Result<Option<usize>> {
        let src = self
            .state
            .active_src()
            .ok_or(PlaybackError::NoTrackLoaded)?;
        Ok(self.history.position_of(src))
    }

    fn emit_queue_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::QueueChanged {
            length: self.queue.len(),
        });
    }

    fn emit_error(&mut self, message: impl Into<String>) {
        self.pending_events.push(PlaybackEvent::Error {
            message: message.into(),
        });
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(PlaybackConfig::default())
    }
}
