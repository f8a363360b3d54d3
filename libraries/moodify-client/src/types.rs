//! Normalized API results.

use bytes::Bytes;
use moodify_core::TrackMetadata;
use std::time::Duration;

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://tricklingly-panatrophic-florencia.ngrok-free.dev";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base address of the inference API
    pub endpoint: String,

    /// Whole-request timeout (inference can be slow)
    pub timeout: Duration,

    /// TCP connect timeout
    pub connect_timeout: Duration,
}

impl ClientConfig {
    /// Create a config for the given endpoint with default timeouts.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Where the audio of an inferred track lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioPayload {
    /// Playable URL
    Remote(String),

    /// Audio returned inline in the response body
    Stream { bytes: Bytes, mime: String },
}

/// A track the API picked, normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferredTrack {
    pub metadata: TrackMetadata,
    pub audio: AudioPayload,

    /// Detected mood label, when the API reports one
    pub mood: Option<String>,
}

/// Raw audio downloaded for playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAudio {
    pub bytes: Bytes,
    pub mime: String,
}
