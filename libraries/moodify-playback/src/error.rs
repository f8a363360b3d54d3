//! Error types for playback management

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// A locally-owned handle was already released
    #[error("Local handle already released: {0}")]
    HandleReleased(String),

    /// Fetched bytes are not playable audio
    #[error("Downloaded file is not an audio type: {0}")]
    NotAudio(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
