use thiserror::Error;

/// Errors that abort a tint run
///
/// None of these reach the user; the engine falls back to the default
/// theme instead.
#[derive(Debug, Error)]
pub enum TintError {
    /// Artwork could not be decoded
    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),

    /// Every sampled pixel was fully transparent
    #[error("Artwork has no opaque pixels")]
    Transparent,

    /// Artwork could not be loaded
    #[error("Failed to load artwork {uri}: {message}")]
    Load { uri: String, message: String },

    /// A CSS color value could not be parsed
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Blocking sample task died
    #[error("Sampling task failed: {0}")]
    Task(String),
}

impl TintError {
    pub fn load(uri: impl Into<String>, message: impl ToString) -> Self {
        Self::Load {
            uri: uri.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for tint operations
pub type Result<T> = std::result::Result<T, TintError>;
