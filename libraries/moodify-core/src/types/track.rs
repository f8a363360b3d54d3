/// Track domain types
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// URI prefix of locally-owned playable handles
///
/// Sources with this prefix point into the session's handle store rather
/// than at a remote resource, and must be released when superseded.
pub const LOCAL_SCHEME: &str = "blob:moodify/";

/// Title used when the inference service does not name the track
const DEFAULT_TITLE: &str = "Track";

/// Display metadata for a track, before a playable source is attached
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    /// Track title
    pub title: String,

    /// Artist name (empty when unknown)
    pub artist: String,

    /// Album name (empty when unknown)
    pub album: String,

    /// Artwork URI
    pub cover: Option<String>,
}

impl TrackMetadata {
    /// Create metadata with just a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the artist
    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = artist.into();
        self
    }

    /// Set the album
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = album.into();
        self
    }

    /// Set the artwork URI; empty strings count as no artwork
    #[must_use]
    pub fn with_cover(mut self, cover: impl Into<String>) -> Self {
        let cover = cover.into();
        self.cover = (!cover.trim().is_empty()).then_some(cover);
        self
    }
}

/// A playable track
///
/// Immutable once constructed. `src` identifies the playable resource for
/// the lifetime of the session; two tracks with the same `src` are the same
/// playable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    title: String,
    artist: String,
    album: String,
    cover: Option<String>,
    src: String,
}

impl Track {
    /// Attach a playable source to display metadata
    pub fn new(metadata: TrackMetadata, src: impl Into<String>) -> Self {
        let title = if metadata.title.trim().is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            metadata.title
        };

        Self {
            title,
            artist: metadata.artist,
            album: metadata.album,
            cover: metadata.cover.filter(|c| !c.trim().is_empty()),
            src: src.into(),
        }
    }

    /// Same metadata, different source
    #[must_use]
    pub fn with_src(&self, src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            ..self.clone()
        }
    }

    /// Same track, different artwork
    ///
    /// A blank cover clears the artwork.
    #[must_use]
    pub fn with_cover(&self, cover: impl Into<String>) -> Self {
        let cover: String = cover.into();
        Self {
            cover: Some(cover).filter(|c| !c.trim().is_empty()),
            ..self.clone()
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn album(&self) -> &str {
        &self.album
    }

    pub fn cover(&self) -> Option<&str> {
        self.cover.as_deref()
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    /// Whether the source is a locally-owned handle
    pub fn is_local(&self) -> bool {
        self.src.starts_with(LOCAL_SCHEME)
    }

    /// Display metadata without the source
    pub fn metadata(&self) -> TrackMetadata {
        TrackMetadata {
            title: self.title.clone(),
            artist: self.artist.clone(),
            album: self.album.clone(),
            cover: self.cover.clone(),
        }
    }
}

/// A track that entered the "now playing" slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The track that was played
    pub track: Track,

    /// When it became the active track
    pub played_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Record a track as played now
    pub fn now(track: Track) -> Self {
        Self {
            track,
            played_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_title_falls_back() {
        let track = Track::new(TrackMetadata::new("  "), "https://example.com/a.mp3");
        assert_eq!(track.title(), "Track");
    }

    #[test]
    fn empty_cover_is_none() {
        let metadata = TrackMetadata::new("Song").with_cover("");
        assert!(metadata.cover.is_none());

        let track = Track::new(
            TrackMetadata {
                cover: Some(String::new()),
                ..TrackMetadata::new("Song")
            },
            "https://example.com/a.mp3",
        );
        assert!(track.cover().is_none());
    }

    #[test]
    fn local_sources_are_detected() {
        let track = Track::new(TrackMetadata::new("Song"), format!("{LOCAL_SCHEME}1234"));
        assert!(track.is_local());

        let remote = track.with_src("https://example.com/a.mp3");
        assert!(!remote.is_local());
        assert_eq!(remote.title(), "Song");
    }

    #[test]
    fn cover_can_be_replaced() {
        let track = Track::new(TrackMetadata::new("Song"), "https://example.com/a.mp3");
        let covered = track.with_cover("https://img.example.com/a.jpg");
        assert_eq!(covered.cover(), Some("https://img.example.com/a.jpg"));
        assert_eq!(covered.src(), track.src());
        assert!(covered.with_cover(" ").cover().is_none());
    }

    #[test]
    fn track_serializes_with_fields() {
        let track = Track::new(
            TrackMetadata::new("Sandstorm").with_artist("Darude"),
            "https://example.com/s.mp3",
        );
        let json = serde_json::to_value(&track).unwrap();
        assert_eq!(json["title"], "Sandstorm");
        assert_eq!(json["artist"], "Darude");
        assert_eq!(json["src"], "https://example.com/s.mp3");
        assert!(json["cover"].is_null());
    }
}
