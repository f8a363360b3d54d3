/// Collaborator traits for Moodify
///
/// The session never talks to a camera or an audio element directly; it goes
/// through these traits so the same orchestration runs against a browser
/// bridge, a headless simulation, or a test double.
use crate::error::Result;
use crate::types::MediaSource;
use async_trait::async_trait;
use bytes::Bytes;

/// Still-frame capture device (webcam widget)
///
/// Must be invokable repeatedly. Callers are responsible for not invoking
/// it while the device is disabled.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Capture a single still frame and return the encoded image bytes
    ///
    /// # Errors
    /// Returns an error if the camera is unavailable or the frame is empty
    async fn capture(&self) -> Result<Bytes>;
}

/// Audio player widget
///
/// Transport commands and playback-state queries. The widget reports
/// asynchronous state changes (ready, ended, errors, style mutations) as
/// [`PlayerNotification`](crate::PlayerNotification)s through a channel
/// handed to it at construction time.
pub trait PlayerWidget: Send {
    /// Replace the loaded source
    ///
    /// The widget reports `Ready` (or `Error`) once the source has been absorbed.
    fn load(&mut self, source: MediaSource) -> Result<()>;

    /// Start or resume playback of the loaded source
    ///
    /// # Errors
    /// Returns an error if no source is loaded or the widget is not ready yet
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self);

    /// Whether audio is currently playing
    fn is_playing(&self) -> bool;

    /// Total duration in seconds (`NaN` while unknown)
    fn duration(&self) -> f64;

    /// Current position in seconds (`NaN` while unknown)
    fn current_time(&self) -> f64;
}
