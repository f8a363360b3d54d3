/// Seam between the session and the inference API
use async_trait::async_trait;
use bytes::Bytes;
use moodify_client::{FetchedAudio, InferenceClient, InferredTrack, Result};

/// What the session needs from the inference API
#[async_trait]
pub trait InferenceService: Send + Sync {
    /// Upload a captured photo and get the track picked for its mood
    async fn submit_photo(&self, photo: Bytes) -> Result<InferredTrack>;

    /// Ask for a specific track by artist and title
    async fn request_track(&self, artist: &str, title: &str) -> Result<InferredTrack>;

    /// Download audio the player could not play directly
    async fn fetch_audio(&self, url: &str) -> Result<FetchedAudio>;
}

#[async_trait]
impl InferenceService for InferenceClient {
    async fn submit_photo(&self, photo: Bytes) -> Result<InferredTrack> {
        InferenceClient::submit_photo(self, photo).await
    }

    async fn request_track(&self, artist: &str, title: &str) -> Result<InferredTrack> {
        InferenceClient::request_track(self, artist, title).await
    }

    async fn fetch_audio(&self, url: &str) -> Result<FetchedAudio> {
        InferenceClient::fetch_audio(self, url).await
    }
}
