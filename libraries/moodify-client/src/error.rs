//! Error types for the inference client.

use thiserror::Error;

/// Errors that can occur when talking to the inference API.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned a non-success status
    #[error("API request failed ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Server answered with an `error` field
    #[error("API error: {0}")]
    Api(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Response was neither audio nor usable JSON
    #[error("Unsupported response from API ({0})")]
    UnsupportedResponse(String),

    /// Song request stream was not audio
    #[error("API stream response was not audio: {content_type} - {body}")]
    StreamNotAudio { content_type: String, body: String },

    /// Downloaded file is not audio
    #[error("Downloaded file is not an audio type: {0}")]
    NotAudio(String),

    /// Invalid endpoint URL
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),
}

impl InferenceError {
    /// Map a transport error, separating "could not reach the server"
    pub(crate) fn from_send(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            Self::ServerUnreachable(e.to_string())
        } else {
            Self::Request(e)
        }
    }
}

/// Result type for inference client operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
