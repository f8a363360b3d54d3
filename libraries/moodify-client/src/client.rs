//! Inference API client.

use crate::error::{InferenceError, Result};
use crate::response::{
    api_error, content_type, file_url, metadata_from_headers, metadata_from_json, mood,
    track_descriptor, GENERATED_TITLE,
};
use crate::types::{AudioPayload, ClientConfig, FetchedAudio, InferredTrack};
use bytes::Bytes;
use moodify_core::is_audio_mime;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

/// Header asking the API to answer with audio when it can
const RETURN_AUDIO_HEADER: &str = "X-Return-Audio";

/// Client for the mood-inference API.
///
/// # Example
///
/// ```ignore
/// use moodify_client::{ClientConfig, InferenceClient};
///
/// let client = InferenceClient::new(ClientConfig::new("http://localhost:5000"))?;
/// let inferred = client.submit_photo(photo_bytes).await?;
/// println!("{} ({:?})", inferred.metadata.title, inferred.mood);
/// ```
#[derive(Clone)]
pub struct InferenceClient {
    http: Client,
    endpoint: String,
    base: Url,
}

impl InferenceClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(InferenceError::InvalidUrl("URL cannot be empty".into()));
        }

        let endpoint = config.endpoint.trim().trim_end_matches('/').to_string();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(InferenceError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        let base = Url::parse(&format!("{endpoint}/"))
            .map_err(|e| InferenceError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(format!("Moodify/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            base,
        })
    }

    /// The normalized endpoint (no trailing slash).
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submit a photo and get back the track the API picked.
    ///
    /// The response is either streamed audio with `X-Track-*` metadata
    /// headers, or JSON naming a file URL. JSON that only names a track is
    /// followed up with a song request.
    pub async fn submit_photo(&self, photo: Bytes) -> Result<InferredTrack> {
        debug!(size = photo.len(), endpoint = %self.endpoint, "Submitting photo");

        let part = Part::bytes(photo.to_vec())
            .file_name("photo.jpg")
            .mime_str("image/jpeg")?;
        let form = Form::new().part("photo", part);

        let response = self
            .http
            .post(&self.endpoint)
            .header(RETURN_AUDIO_HEADER, "1")
            .multipart(form)
            .send()
            .await
            .map_err(InferenceError::from_send)?;
        let response = check_status(response).await?;

        let content_type = content_type(response.headers());
        if is_audio_mime(&content_type) {
            let metadata = metadata_from_headers(response.headers(), GENERATED_TITLE, "");
            let bytes = response.bytes().await?;
            info!(title = %metadata.title, size = bytes.len(), "Received streamed track");
            return Ok(InferredTrack {
                metadata,
                audio: AudioPayload::Stream {
                    bytes,
                    mime: content_type,
                },
                mood: None,
            });
        }

        if content_type.contains("application/json") {
            let json: Value = response
                .json()
                .await
                .map_err(|e| InferenceError::ParseError(e.to_string()))?;
            return self.track_from_json(&json).await;
        }

        // Unlabelled bodies still get a chance as JSON
        let body = response.bytes().await?;
        match serde_json::from_slice::<Value>(&body) {
            Ok(json) => self.track_from_json(&json).await,
            Err(_) => Err(InferenceError::UnsupportedResponse(content_type)),
        }
    }

    /// Ask the API for a specific song.
    ///
    /// Tries for a file URL first, then asks for the audio inline.
    pub async fn request_track(&self, artist: &str, title: &str) -> Result<InferredTrack> {
        let url = format!("{}/request_song", self.endpoint);
        let payload = json!({ "artist": artist, "title": title });
        debug!(artist = %artist, title = %title, "Requesting song");

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(InferenceError::from_send)?;
        let response = check_status(response).await?;

        if content_type(response.headers()).contains("application/json") {
            let json: Value = response
                .json()
                .await
                .map_err(|e| InferenceError::ParseError(e.to_string()))?;
            if let Some(message) = api_error(&json) {
                return Err(InferenceError::Api(message));
            }
            if let Some(file) = file_url(&json) {
                return Ok(InferredTrack {
                    metadata: metadata_from_json(&json, title, artist),
                    audio: AudioPayload::Remote(self.resolve_url(&file)?),
                    mood: mood(&json),
                });
            }
        }

        let response = self
            .http
            .post(&url)
            .header(RETURN_AUDIO_HEADER, "1")
            .json(&payload)
            .send()
            .await
            .map_err(InferenceError::from_send)?;
        let response = check_status(response).await?;

        let content_type = content_type(response.headers());
        if !is_audio_mime(&content_type) {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::StreamNotAudio { content_type, body });
        }

        let metadata = metadata_from_headers(response.headers(), title, artist);
        let bytes = response.bytes().await?;
        Ok(InferredTrack {
            metadata,
            audio: AudioPayload::Stream {
                bytes,
                mime: content_type,
            },
            mood: None,
        })
    }

    /// Download a track as raw bytes, insisting on an audio media type.
    pub async fn fetch_audio(&self, url: &str) -> Result<FetchedAudio> {
        let response = self.get(url).await?;
        let mime = content_type(response.headers());
        if !is_audio_mime(&mime) {
            return Err(InferenceError::NotAudio(mime));
        }
        let bytes = response.bytes().await?;
        debug!(url = %url, size = bytes.len(), mime = %mime, "Fetched audio");
        Ok(FetchedAudio { bytes, mime })
    }

    /// Download arbitrary bytes (artwork).
    pub async fn fetch_bytes(&self, url: &str) -> Result<Bytes> {
        let response = self.get(url).await?;
        Ok(response.bytes().await?)
    }

    async fn get(&self, url: &str) -> Result<Response> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(InferenceError::from_send)?;
        check_status(response).await
    }

    async fn track_from_json(&self, json: &Value) -> Result<InferredTrack> {
        if let Some(message) = api_error(json) {
            return Err(InferenceError::Api(message));
        }
        let mood = mood(json);

        if let Some(file) = file_url(json) {
            let metadata = metadata_from_json(json, GENERATED_TITLE, "");
            info!(title = %metadata.title, mood = ?mood, "API picked a track");
            return Ok(InferredTrack {
                metadata,
                audio: AudioPayload::Remote(self.resolve_url(&file)?),
                mood,
            });
        }

        let Some((title, artist)) = track_descriptor(json) else {
            return Err(InferenceError::ParseError(
                "response names no playable track".into(),
            ));
        };

        debug!(title = %title, artist = %artist, "No file URL, following up with a song request");
        let mut track = self.request_track(&artist, &title).await?;
        track.mood = mood.or(track.mood);
        Ok(track)
    }

    /// Resolve a possibly relative file reference against the endpoint
    fn resolve_url(&self, reference: &str) -> Result<String> {
        self.base
            .join(reference)
            .map(String::from)
            .map_err(|e| InferenceError::InvalidUrl(format!("{reference}: {e}")))
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(InferenceError::ServerError {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_validation() {
        assert!(InferenceClient::new(ClientConfig::new("https://example.com")).is_ok());
        assert!(InferenceClient::new(ClientConfig::new("http://localhost:5000")).is_ok());

        assert!(InferenceClient::new(ClientConfig::new("")).is_err());
        assert!(InferenceClient::new(ClientConfig::new("not-a-url")).is_err());
        assert!(InferenceClient::new(ClientConfig::new("ftp://example.com")).is_err());
    }

    #[test]
    fn url_normalization() {
        let client = InferenceClient::new(ClientConfig::new("https://example.com//")).unwrap();
        assert_eq!(client.endpoint(), "https://example.com");
    }

    #[test]
    fn relative_file_references_resolve_against_endpoint() {
        let client = InferenceClient::new(ClientConfig::new("http://localhost:5000")).unwrap();
        assert_eq!(
            client.resolve_url("/files/a.mp3").unwrap(),
            "http://localhost:5000/files/a.mp3"
        );
        assert_eq!(
            client.resolve_url("https://cdn.example.com/b.mp3").unwrap(),
            "https://cdn.example.com/b.mp3"
        );
    }
}
