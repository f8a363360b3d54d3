//! Locally-owned playable handles
//!
//! Audio that arrives as bytes (streamed inference responses, fallback
//! re-fetches) is parked here under a `blob:moodify/<uuid>` URI so it can
//! travel through the queue like any remote track. Each handle has a single
//! owner and must be released once nothing references it anymore.

use crate::error::{PlaybackError, Result};
use bytes::Bytes;
use moodify_core::{MediaSource, LOCAL_SCHEME};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoredMedia {
    bytes: Bytes,
    mime: String,
}

/// Registry of locally-owned audio
#[derive(Debug, Default)]
pub struct HandleStore {
    entries: HashMap<String, StoredMedia>,
}

impl HandleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Park bytes and return the URI that now owns them
    pub fn create(&mut self, bytes: Bytes, mime: impl Into<String>) -> String {
        let uri = format!("{LOCAL_SCHEME}{}", Uuid::new_v4());
        let mime = mime.into();
        debug!(uri = %uri, size = bytes.len(), mime = %mime, "Created local handle");
        self.entries.insert(uri.clone(), StoredMedia { bytes, mime });
        uri
    }

    /// Resolve a handle into something a player can load
    pub fn resolve(&self, uri: &str) -> Result<MediaSource> {
        let stored = self
            .entries
            .get(uri)
            .ok_or_else(|| PlaybackError::HandleReleased(uri.to_string()))?;

        Ok(MediaSource::Local {
            uri: uri.to_string(),
            bytes: stored.bytes.clone(),
            mime: stored.mime.clone(),
        })
    }

    /// Whether the handle is still held
    pub fn is_live(&self, uri: &str) -> bool {
        self.entries.contains_key(uri)
    }

    /// Release a handle
    ///
    /// Releasing an unknown or already released handle is an error; callers
    /// treat release as best-effort and swallow it.
    pub fn release(&mut self, uri: &str) -> Result<()> {
        match self.entries.remove(uri) {
            Some(stored) => {
                debug!(uri = %uri, size = stored.bytes.len(), "Released local handle");
                Ok(())
            }
            None => Err(PlaybackError::HandleReleased(uri.to_string())),
        }
    }

    /// Release everything (session teardown)
    ///
    /// Returns how many handles were still held.
    pub fn release_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// Number of live handles
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no handle is held
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
