/// Notifications emitted by a player widget
use serde::{Deserialize, Serialize};

/// Classification of a playback error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerErrorKind {
    /// The widget cannot decode the source's format
    UnsupportedFormat,

    /// Any other failure (network, aborted, decode mid-stream)
    Other(String),
}

impl PlayerErrorKind {
    /// Classify a widget error message
    ///
    /// Audio elements report format problems with messages mentioning
    /// "unsupported" (e.g. `MEDIA_ERR_SRC_NOT_SUPPORTED`).
    pub fn classify(message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        if lower.contains("unsupported") || lower.contains("not_supported") {
            Self::UnsupportedFormat
        } else {
            Self::Other(message.to_string())
        }
    }
}

/// Asynchronous notification from a player widget
///
/// Source-specific notifications carry the `src` they refer to so late
/// notifications from a superseded source can be told apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerNotification {
    /// Source loaded; transport commands are now valid
    Ready { src: String },

    /// Playback started or resumed
    Playing { src: String },

    /// Playback paused
    Paused { src: String },

    /// The source played to its end
    Ended { src: String },

    /// The source failed
    Error { src: String, kind: PlayerErrorKind },

    /// The widget's visual layers (blur, overlay, panel) changed style
    StyleChanged,

    /// The widget switched the artwork it shows for the current source
    ArtworkChanged { cover: String },
}
