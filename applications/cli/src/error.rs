/// Application error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Inference error: {0}")]
    Inference(#[from] moodify_client::InferenceError),

    #[error("Playback error: {0}")]
    Playback(#[from] moodify_playback::PlaybackError),

    #[error("Tint error: {0}")]
    Tint(#[from] moodify_tint::TintError),

    #[error(transparent)]
    Core(#[from] moodify_core::MoodifyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session has shut down")]
    SessionClosed,
}
