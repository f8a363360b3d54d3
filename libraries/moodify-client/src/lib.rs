//! HTTP client for the Moodify mood-inference API.
//!
//! Submits a photo, normalizes whatever the service answers (streamed audio
//! or one of several JSON shapes) into an [`InferredTrack`], requests songs
//! by name, and downloads audio for the unsupported-format fallback.
//!
//! # Example
//!
//! ```ignore
//! use moodify_client::{AudioPayload, ClientConfig, InferenceClient};
//!
//! let client = InferenceClient::new(ClientConfig::new("http://localhost:5000"))?;
//! let inferred = client.request_track("Darude", "Sandstorm").await?;
//!
//! match inferred.audio {
//!     AudioPayload::Remote(url) => println!("play {url}"),
//!     AudioPayload::Stream { bytes, mime } => println!("{} bytes of {mime}", bytes.len()),
//! }
//! ```

#![forbid(unsafe_code)]

mod client;
mod error;
pub mod response;
mod types;

pub use client::InferenceClient;
pub use error::{InferenceError, Result};
pub use types::{AudioPayload, ClientConfig, FetchedAudio, InferredTrack, DEFAULT_ENDPOINT};
