/// Artwork loading for the tint engine
use async_trait::async_trait;
use bytes::Bytes;
use moodify_client::InferenceClient;
use moodify_tint::{ArtworkLoader, Result, TintError};
use std::path::PathBuf;
use tracing::debug;

/// Loads artwork over http(s) or from the local filesystem
///
/// `file://` URIs and bare paths are read from disk; everything else goes
/// through the inference client's HTTP stack.
#[derive(Clone)]
pub struct SourceArtworkLoader {
    client: InferenceClient,
}

impl SourceArtworkLoader {
    pub fn new(client: InferenceClient) -> Self {
        Self { client }
    }
}

fn local_path(uri: &str) -> Option<PathBuf> {
    if let Some(path) = uri.strip_prefix("file://") {
        return Some(PathBuf::from(path));
    }
    if uri.contains("://") || uri.starts_with("data:") || uri.starts_with("blob:") {
        return None;
    }
    Some(PathBuf::from(uri))
}

#[async_trait]
impl ArtworkLoader for SourceArtworkLoader {
    async fn load(&self, uri: &str) -> Result<Bytes> {
        if let Some(path) = local_path(uri) {
            debug!(path = %path.display(), "Reading artwork from disk");
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| TintError::load(uri, e.to_string()))?;
            return Ok(Bytes::from(bytes));
        }

        if !uri.starts_with("http://") && !uri.starts_with("https://") {
            return Err(TintError::load(uri, "unsupported artwork scheme"));
        }

        self.client
            .fetch_bytes(uri)
            .await
            .map_err(|e| TintError::load(uri, e.to_string()))
    }
}
