/// Player that keeps time without producing sound
use bytes::Bytes;
use lofty::{AudioFile, Probe};
use moodify_core::{
    MediaSource, MoodifyError, PlayerErrorKind, PlayerNotification, PlayerWidget, Result,
};
use std::io::Cursor;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

struct Loaded {
    src: String,
    duration: f64,
}

/// Simulated audio element
///
/// Tracks a playback clock for the loaded source and reports `Ready`,
/// `Playing`, `Paused` and `Ended` like a real element would. Local audio is
/// probed for its duration; remote audio and unprobeable bytes get the
/// configured fallback duration. Non-http remote sources are reported as an
/// unsupported format.
pub struct HeadlessPlayer {
    events: UnboundedSender<PlayerNotification>,
    fallback_duration: Duration,
    loaded: Option<Loaded>,

    /// Position accumulated before the current play stretch
    position: f64,
    started_at: Option<Instant>,
    end_timer: Option<JoinHandle<()>>,
}

impl HeadlessPlayer {
    pub fn new(events: UnboundedSender<PlayerNotification>, fallback_duration: Duration) -> Self {
        Self {
            events,
            fallback_duration,
            loaded: None,
            position: 0.0,
            started_at: None,
            end_timer: None,
        }
    }

    /// Source currently loaded
    pub fn src(&self) -> Option<&str> {
        self.loaded.as_ref().map(|l| l.src.as_str())
    }

    fn notify(&self, notification: PlayerNotification) {
        // The session may already be gone during teardown
        let _ = self.events.send(notification);
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.end_timer.take() {
            timer.abort();
        }
    }

    fn elapsed(&self) -> f64 {
        self.started_at
            .map_or(0.0, |started| started.elapsed().as_secs_f64())
    }

    fn probe_duration(&self, bytes: &Bytes) -> f64 {
        let probed = Probe::new(Cursor::new(&bytes[..]))
            .guess_file_type()
            .map_err(|e| e.to_string())
            .and_then(|probe| probe.read().map_err(|e| e.to_string()));

        match probed {
            Ok(tagged) => {
                let duration = tagged.properties().duration().as_secs_f64();
                if duration > 0.0 {
                    duration
                } else {
                    self.fallback_duration.as_secs_f64()
                }
            }
            Err(e) => {
                debug!(error = %e, "Could not probe audio, using fallback duration");
                self.fallback_duration.as_secs_f64()
            }
        }
    }
}

impl PlayerWidget for HeadlessPlayer {
    fn load(&mut self, source: MediaSource) -> Result<()> {
        self.stop_timer();
        self.position = 0.0;
        self.started_at = None;
        self.loaded = None;

        let src = source.uri().to_string();
        let duration = match &source {
            MediaSource::Remote(url) => {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    warn!(src = %src, "Cannot play remote source");
                    self.notify(PlayerNotification::Error {
                        src,
                        kind: PlayerErrorKind::UnsupportedFormat,
                    });
                    return Ok(());
                }
                self.fallback_duration.as_secs_f64()
            }
            MediaSource::Local { bytes, .. } => self.probe_duration(bytes),
        };

        debug!(src = %src, duration, "Loaded source");
        self.loaded = Some(Loaded {
            src: src.clone(),
            duration,
        });
        self.notify(PlayerNotification::Ready { src });
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        let Some(loaded) = &self.loaded else {
            return Err(MoodifyError::player("no source loaded"));
        };
        if self.started_at.is_some() {
            return Ok(());
        }

        let src = loaded.src.clone();
        let remaining = (loaded.duration - self.position).max(0.0);
        self.started_at = Some(Instant::now());

        let events = self.events.clone();
        let ended_src = src.clone();
        self.end_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs_f64(remaining)).await;
            let _ = events.send(PlayerNotification::Ended { src: ended_src });
        }));

        self.notify(PlayerNotification::Playing { src });
        Ok(())
    }

    fn pause(&mut self) {
        if self.started_at.is_none() {
            return;
        }
        self.position = self.current_time();
        self.started_at = None;
        self.stop_timer();

        if let Some(loaded) = &self.loaded {
            self.notify(PlayerNotification::Paused {
                src: loaded.src.clone(),
            });
        }
    }

    fn is_playing(&self) -> bool {
        match &self.loaded {
            Some(loaded) => self.started_at.is_some() && self.current_time() < loaded.duration,
            None => false,
        }
    }

    fn duration(&self) -> f64 {
        self.loaded.as_ref().map_or(f64::NAN, |l| l.duration)
    }

    fn current_time(&self) -> f64 {
        match &self.loaded {
            Some(loaded) => (self.position + self.elapsed()).min(loaded.duration),
            None => f64::NAN,
        }
    }
}

impl Drop for HeadlessPlayer {
    fn drop(&mut self) {
        self.stop_timer();
    }
}
