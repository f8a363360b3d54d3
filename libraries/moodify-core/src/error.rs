/// Core error types for Moodify
use thiserror::Error;

/// Result type alias using `MoodifyError`
pub type Result<T> = std::result::Result<T, MoodifyError>;

/// Core error type for Moodify collaborators
#[derive(Error, Debug)]
pub enum MoodifyError {
    /// Camera unavailable, permission denied, or the frame could not be read
    #[error("Capture error: {0}")]
    Capture(String),

    /// Capture returned no image data
    #[error("Capture returned an empty frame")]
    EmptyCapture,

    /// Capture was requested while the device is disabled
    #[error("Capture is disabled while a request is in flight")]
    CaptureDisabled,

    /// Player widget rejected a transport command
    #[error("Player error: {0}")]
    Player(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MoodifyError {
    /// Create a capture error
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Create a player error
    pub fn player(msg: impl Into<String>) -> Self {
        Self::Player(msg.into())
    }
}
