//! Session orchestration
//!
//! One task owns the playback controller, the auto-capture trigger and the
//! tint engine. Everything that touches them is serialized through its
//! `select!` loop: UI commands, player notifications, results of spawned
//! I/O (capture, inference, fallback fetches, tint runs) and timers.
//! Controller events are drained after every step and turned into player
//! commands and [`SessionNotice`]s.

use crate::error::{AppError, Result};
use crate::services::InferenceService;
use bytes::Bytes;
use moodify_client::{AudioPayload, FetchedAudio, InferredTrack};
use moodify_core::{
    CaptureDevice, HistoryEntry, MoodifyError, PlayerErrorKind, PlayerNotification, PlayerWidget,
    Track,
};
use moodify_playback::{
    AutoCapture, AutoCaptureConfig, CaptureTicket, FallbackRequest, PlayStart, PlaybackConfig,
    PlaybackController, PlaybackEvent, PlaybackState,
};
use moodify_tint::{
    run_job, ArtworkLoader, ThemeColors, ThemeInputProvider, TintConfig, TintEngine, TintOutcome,
    TintRun,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Commands accepted from the UI
#[derive(Debug)]
pub enum SessionCommand {
    /// Take a photo and ask the API for a matching track
    Capture,

    /// Ask the API for a specific track
    RequestTrack { artist: String, title: String },

    PlayFromQueue(usize),
    RemoveFromQueue(usize),
    PlayFromHistory(usize),
    Previous,
    Next,
    Pause,
    Resume,

    /// The player's visual layers changed style
    StyleChanged,

    Snapshot(oneshot::Sender<SessionSnapshot>),
    Shutdown,
}

/// What the UI should show
#[derive(Debug, Clone, PartialEq)]
pub enum SessionNotice {
    TrackActivated(Track),
    TrackQueued { track: Track, position: usize },

    /// The active track now shows different artwork
    ArtworkChanged(Track),

    Mood(String),
    Theme(ThemeColors),

    /// The active track ended with nothing queued
    Idle { src: String },

    Error(String),
}

/// Point-in-time view of the session
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: PlaybackState,
    pub queue: Vec<Track>,
    pub history: Vec<HistoryEntry>,
    pub theme: ThemeColors,
    pub inference_in_flight: bool,
    pub live_handles: usize,
}

/// Session settings
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub playback: PlaybackConfig,
    pub capture: AutoCaptureConfig,
    pub tint: TintConfig,

    /// Shown paused at startup
    pub initial_track: Option<Track>,
}

/// Collaborators the session drives
pub struct SessionDeps {
    pub camera: Arc<dyn CaptureDevice>,
    pub inference: Arc<dyn InferenceService>,
    pub player: Box<dyn PlayerWidget>,

    /// Notifications emitted by `player`
    pub player_events: mpsc::UnboundedReceiver<PlayerNotification>,

    pub artwork: Arc<dyn ArtworkLoader>,
    pub theme_inputs: Arc<dyn ThemeInputProvider>,
}

/// Results of work spawned off the loop
#[derive(Debug)]
enum Internal {
    CaptureDone {
        ticket: Option<CaptureTicket>,
        result: moodify_core::Result<Bytes>,
    },
    InferenceDone(moodify_client::Result<InferredTrack>),
    FallbackDone {
        request: FallbackRequest,
        result: moodify_client::Result<FetchedAudio>,
    },
    TintDone(TintOutcome),
    SettleElapsed {
        src: String,
    },
}

/// Cloneable handle for sending commands to a running session
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub async fn send(&self, command: SessionCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| AppError::SessionClosed)
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::Snapshot(tx)).await?;
        rx.await.map_err(|_| AppError::SessionClosed)
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(SessionCommand::Shutdown).await
    }
}

pub struct Session {
    controller: PlaybackController,
    autocapture: AutoCapture,
    tint: TintEngine,

    camera: Arc<dyn CaptureDevice>,
    inference: Arc<dyn InferenceService>,
    player: Box<dyn PlayerWidget>,
    artwork: Arc<dyn ArtworkLoader>,
    theme_inputs: Arc<dyn ThemeInputProvider>,

    commands: mpsc::Receiver<SessionCommand>,
    player_events: mpsc::UnboundedReceiver<PlayerNotification>,
    internal_tx: mpsc::UnboundedSender<Internal>,
    internal_rx: mpsc::UnboundedReceiver<Internal>,
    notices: mpsc::UnboundedSender<SessionNotice>,

    settle_delay: Duration,

    /// Source that plays once the widget reports it ready
    play_on_ready: Option<String>,

    inference_in_flight: bool,
    manual_capture_running: bool,
}

impl Session {
    /// Build a session
    ///
    /// Returns the session (to be driven with [`Session::run`]), a handle for
    /// commands and the stream of notices for the UI.
    pub fn new(
        config: SessionConfig,
        deps: SessionDeps,
    ) -> (Self, SessionHandle, mpsc::UnboundedReceiver<SessionNotice>) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();

        let mut session = Self {
            settle_delay: config.playback.settle_delay,
            controller: PlaybackController::new(config.playback),
            autocapture: AutoCapture::new(config.capture),
            tint: TintEngine::new(config.tint),
            camera: deps.camera,
            inference: deps.inference,
            player: deps.player,
            artwork: deps.artwork,
            theme_inputs: deps.theme_inputs,
            commands: command_rx,
            player_events: deps.player_events,
            internal_tx,
            internal_rx,
            notices: notice_tx,
            play_on_ready: None,
            inference_in_flight: false,
            manual_capture_running: false,
        };
        if let Some(track) = config.initial_track {
            session.controller.preload(track);
        }

        (
            session,
            SessionHandle {
                commands: command_tx,
            },
            notice_rx,
        )
    }

    /// Drive the session until shutdown or until every handle is dropped
    pub async fn run(mut self) {
        info!("Session started");

        let mut ticker = time::interval(self.autocapture.config().tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.flush_events();

        loop {
            let armed = self.autocapture.is_armed();
            let debounce = self.tint.debounce_deadline();

            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(SessionCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(notification) = self.player_events.recv() => {
                    self.handle_player(notification);
                }
                Some(internal) = self.internal_rx.recv() => {
                    self.handle_internal(internal);
                }
                _ = ticker.tick(), if armed => self.on_tick(),
                () = time::sleep_until(debounce.unwrap_or_else(Instant::now)), if debounce.is_some() => {
                    if let Some(run) = self.tint.fire_debounced(self.theme_inputs.as_ref()) {
                        self.start_tint(run);
                    }
                }
            }

            self.flush_events();
        }

        self.player.pause();
        self.controller.shutdown();
        info!(
            live_handles = self.controller.handles().len(),
            "Session stopped"
        );
    }

    // ===== Commands =====

    fn handle_command(&mut self, command: SessionCommand) {
        debug!(?command, "Session command");
        match command {
            SessionCommand::Capture => self.manual_capture(),
            SessionCommand::RequestTrack { artist, title } => self.request_track(artist, title),
            SessionCommand::PlayFromQueue(index) => {
                let result = self.controller.play_from_queue(index).map(|_| ());
                self.report(result);
            }
            SessionCommand::RemoveFromQueue(index) => {
                let result = self.controller.remove_from_queue(index).map(|_| ());
                self.report(result);
            }
            SessionCommand::PlayFromHistory(index) => {
                let result = self.controller.play_from_history(index).map(|_| ());
                self.report(result);
            }
            SessionCommand::Previous => {
                let result = self.controller.play_previous().map(|_| ());
                self.report(result);
            }
            SessionCommand::Next => {
                let result = self.controller.play_next().map(|_| ());
                self.report(result);
            }
            SessionCommand::Pause => {
                if let Some(src) = self.active_src() {
                    self.player.pause();
                    self.controller.mark_paused(&src);
                }
            }
            SessionCommand::Resume => {
                if let Some(src) = self.active_src() {
                    self.start_playback(&src);
                }
            }
            SessionCommand::StyleChanged => self.tint.layers_changed(Instant::now()),
            SessionCommand::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            SessionCommand::Shutdown => {}
        }
    }

    fn report<E: std::fmt::Display>(&self, result: std::result::Result<(), E>) {
        if let Err(e) = result {
            self.notify(SessionNotice::Error(e.to_string()));
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.controller.state().clone(),
            queue: self
                .controller
                .queue()
                .get_all()
                .into_iter()
                .cloned()
                .collect(),
            history: self
                .controller
                .history()
                .get_all()
                .into_iter()
                .cloned()
                .collect(),
            theme: self.tint.current(),
            inference_in_flight: self.inference_in_flight,
            live_handles: self.controller.handles().len(),
        }
    }

    fn active_src(&self) -> Option<String> {
        self.controller.state().active_src().map(str::to_string)
    }

    // ===== Capture and inference =====

    fn capture_enabled(&self) -> bool {
        !self.inference_in_flight && !self.manual_capture_running && !self.autocapture.is_in_flight()
    }

    fn manual_capture(&mut self) {
        if !self.capture_enabled() {
            self.notify(SessionNotice::Error(MoodifyError::CaptureDisabled.to_string()));
            return;
        }
        self.manual_capture_running = true;
        self.spawn_capture(None);
    }

    fn on_tick(&mut self) {
        self.controller.observe_clock(
            self.player.is_playing(),
            self.player.duration(),
            self.player.current_time(),
        );

        // The camera is disabled while a request is in flight
        if !self.capture_enabled() {
            return;
        }
        if let Some(ticket) = self.autocapture.tick(self.controller.state()) {
            info!(src = %ticket.src(), "Auto-capturing near end of track");
            self.spawn_capture(Some(ticket));
        }
    }

    fn spawn_capture(&self, ticket: Option<CaptureTicket>) {
        let camera = Arc::clone(&self.camera);
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let result = camera.capture().await;
            let _ = tx.send(Internal::CaptureDone { ticket, result });
        });
    }

    fn on_capture_done(
        &mut self,
        ticket: Option<CaptureTicket>,
        result: moodify_core::Result<Bytes>,
    ) {
        // A track request may have started while the camera was busy
        if self.inference_in_flight {
            debug!("Dropping photo, a request is already in flight");
            match ticket {
                Some(ticket) => {
                    self.autocapture.finish(ticket, false);
                }
                None => {
                    self.manual_capture_running = false;
                    self.notify(SessionNotice::Error(MoodifyError::CaptureDisabled.to_string()));
                }
            }
            return;
        }

        match ticket {
            Some(ticket) => {
                self.autocapture.finish(ticket, result.is_ok());
                match result {
                    Ok(photo) => self.start_inference(photo),
                    Err(e) => warn!(error = %e, "Auto-capture failed"),
                }
            }
            None => {
                self.manual_capture_running = false;
                match result {
                    Ok(photo) => self.start_inference(photo),
                    Err(e) => self.notify(SessionNotice::Error(e.to_string())),
                }
            }
        }
    }

    fn start_inference(&mut self, photo: Bytes) {
        debug!(size = photo.len(), "Submitting photo");
        self.inference_in_flight = true;
        let inference = Arc::clone(&self.inference);
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let result = inference.submit_photo(photo).await;
            let _ = tx.send(Internal::InferenceDone(result));
        });
    }

    fn request_track(&mut self, artist: String, title: String) {
        if self.inference_in_flight {
            self.notify(SessionNotice::Error(MoodifyError::CaptureDisabled.to_string()));
            return;
        }
        self.inference_in_flight = true;
        let inference = Arc::clone(&self.inference);
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let result = inference.request_track(&artist, &title).await;
            let _ = tx.send(Internal::InferenceDone(result));
        });
    }

    fn on_inference_done(&mut self, result: moodify_client::Result<InferredTrack>) {
        self.inference_in_flight = false;

        let inferred = match result {
            Ok(inferred) => inferred,
            Err(e) => {
                warn!(error = %e, "Inference failed");
                self.notify(SessionNotice::Error(e.to_string()));
                return;
            }
        };

        if let Some(mood) = inferred.mood {
            self.notify(SessionNotice::Mood(mood));
        }

        let outcome = match inferred.audio {
            AudioPayload::Remote(url) => Ok(self.controller.submit(Track::new(inferred.metadata, url))),
            AudioPayload::Stream { bytes, mime } => {
                self.controller.submit_local(inferred.metadata, bytes, &mime)
            }
        };

        if let Err(e) = outcome {
            self.notify(SessionNotice::Error(e.to_string()));
        }
    }

    // ===== Player =====

    fn handle_player(&mut self, notification: PlayerNotification) {
        debug!(?notification, "Player notification");
        match notification {
            PlayerNotification::Ready { src } => {
                if self.play_on_ready.as_deref() == Some(src.as_str()) {
                    self.play_on_ready = None;
                    if self.controller.should_play(&src) {
                        self.start_playback(&src);
                    }
                }
            }
            PlayerNotification::Playing { src } => self.controller.mark_playing(&src),
            PlayerNotification::Paused { src } => self.controller.mark_paused(&src),
            PlayerNotification::Ended { src } => {
                self.controller.on_playback_ended(&src);
            }
            PlayerNotification::Error { src, kind } => self.on_player_error(&src, kind),
            PlayerNotification::StyleChanged => self.tint.layers_changed(Instant::now()),
            PlayerNotification::ArtworkChanged { cover } => {
                self.controller.update_cover(&cover);
            }
        }
    }

    fn start_playback(&mut self, src: &str) {
        match self.player.play() {
            Ok(()) => self.controller.mark_playing(src),
            Err(e) => {
                let kind = PlayerErrorKind::classify(&e.to_string());
                self.on_player_error(src, kind);
            }
        }
    }

    fn on_player_error(&mut self, src: &str, kind: PlayerErrorKind) {
        // A failed source is stopped, so clock polls do not report it playing
        if self.controller.state().active_src() == Some(src) {
            self.player.pause();
        }

        let Some(request) = self.controller.on_player_error(src, kind) else {
            return;
        };

        info!(src = %request.src(), "Re-fetching audio the player could not decode");
        let inference = Arc::clone(&self.inference);
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let result = inference.fetch_audio(request.src()).await;
            let _ = tx.send(Internal::FallbackDone { request, result });
        });
    }

    fn on_fallback_done(
        &mut self,
        request: &FallbackRequest,
        result: moodify_client::Result<FetchedAudio>,
    ) {
        match result {
            Ok(audio) => {
                if let Err(e) = self
                    .controller
                    .complete_fallback(request, audio.bytes, &audio.mime)
                {
                    self.controller.fail_fallback(request, e.to_string());
                }
            }
            Err(e) => self.controller.fail_fallback(request, e.to_string()),
        }
    }

    /// Load a newly activated track and schedule its start
    fn load_active(&mut self, track: &Track, start: PlayStart) {
        let src = track.src().to_string();
        self.play_on_ready = None;

        match self.controller.resolve_source(track) {
            Ok(source) => {
                if let Err(e) = self.player.load(source) {
                    let kind = PlayerErrorKind::classify(&e.to_string());
                    self.on_player_error(&src, kind);
                    return;
                }
            }
            Err(e) => {
                self.notify(SessionNotice::Error(e.to_string()));
                return;
            }
        }

        match start {
            PlayStart::AfterSettle => {
                let tx = self.internal_tx.clone();
                let delay = self.settle_delay;
                tokio::spawn(async move {
                    time::sleep(delay).await;
                    let _ = tx.send(Internal::SettleElapsed { src });
                });
            }
            PlayStart::OnReady => self.play_on_ready = Some(src),
            PlayStart::Paused => debug!(src = %src, "Loaded paused"),
        }
    }

    // ===== Tint =====

    fn start_tint(&mut self, run: TintRun) {
        match run {
            TintRun::Immediate(theme) => self.notify(SessionNotice::Theme(theme)),
            TintRun::Load(job) => {
                debug!(generation = job.generation, uri = %job.uri, "Starting tint run");
                let loader = Arc::clone(&self.artwork);
                let sampler = self.tint.sampler().clone();
                let tx = self.internal_tx.clone();
                tokio::spawn(async move {
                    let outcome = run_job(job, loader.as_ref(), &sampler).await;
                    let _ = tx.send(Internal::TintDone(outcome));
                });
            }
        }
    }

    // ===== Internal results =====

    fn handle_internal(&mut self, internal: Internal) {
        match internal {
            Internal::CaptureDone { ticket, result } => self.on_capture_done(ticket, result),
            Internal::InferenceDone(result) => self.on_inference_done(result),
            Internal::FallbackDone { request, result } => self.on_fallback_done(&request, result),
            Internal::TintDone(outcome) => {
                if let Some(theme) = self.tint.complete(outcome) {
                    self.notify(SessionNotice::Theme(theme));
                }
            }
            Internal::SettleElapsed { src } => {
                if self.controller.should_play(&src) {
                    self.start_playback(&src);
                }
            }
        }
    }

    // ===== Events =====

    /// Turn controller events into player commands and notices
    ///
    /// Loading a track can fail synchronously and emit further events, so
    /// this drains until the controller is quiet.
    fn flush_events(&mut self) {
        while self.controller.has_pending_events() {
            for event in self.controller.drain_events() {
                match event {
                    PlaybackEvent::TrackActivated { track, start, .. } => {
                        self.load_active(&track, start);
                        if let Some(run) = self
                            .tint
                            .artwork_changed(track.cover(), self.theme_inputs.as_ref())
                        {
                            self.start_tint(run);
                        }
                        self.notify(SessionNotice::TrackActivated(track));
                    }
                    PlaybackEvent::TrackUpdated { track } => {
                        if let Some(run) = self
                            .tint
                            .artwork_changed(track.cover(), self.theme_inputs.as_ref())
                        {
                            self.start_tint(run);
                        }
                        self.notify(SessionNotice::ArtworkChanged(track));
                    }
                    PlaybackEvent::TrackQueued { track, position } => {
                        self.notify(SessionNotice::TrackQueued { track, position });
                    }
                    PlaybackEvent::QueueChanged { length } => debug!(length, "Queue changed"),
                    PlaybackEvent::Idle { src } => self.notify(SessionNotice::Idle { src }),
                    PlaybackEvent::HandleReleased { uri } => debug!(uri = %uri, "Handle released"),
                    PlaybackEvent::Error { message } => self.notify(SessionNotice::Error(message)),
                }
            }
        }

        self.autocapture.sync_armed(self.controller.state());
    }

    fn notify(&self, notice: SessionNotice) {
        // Nobody listening is fine; the session keeps running headless
        let _ = self.notices.send(notice);
    }
}
