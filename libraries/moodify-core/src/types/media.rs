/// Playable media handed to a player widget
use bytes::Bytes;

/// What a player widget loads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Remote resource the widget fetches itself
    Remote(String),

    /// Bytes held by the session's handle store
    Local {
        /// Handle URI (`blob:moodify/...`)
        uri: String,
        /// Encoded audio
        bytes: Bytes,
        /// Declared media type
        mime: String,
    },
}

impl MediaSource {
    /// The URI the source was resolved from
    pub fn uri(&self) -> &str {
        match self {
            Self::Remote(url) => url,
            Self::Local { uri, .. } => uri,
        }
    }
}

/// Whether a declared media type may be played
///
/// Accepts any `audio/*` type and the unspecified `application/octet-stream`.
/// Parameters (`; charset=...`) are ignored; everything else, including an
/// empty type, is rejected.
pub fn is_audio_mime(mime: &str) -> bool {
    let essence = mime
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence.starts_with("audio/") || essence == "application/octet-stream"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_mime_types() {
        assert!(is_audio_mime("audio/mpeg"));
        assert!(is_audio_mime("Audio/OGG"));
        assert!(is_audio_mime("audio/wav; codecs=1"));
        assert!(is_audio_mime("application/octet-stream"));

        assert!(!is_audio_mime(""));
        assert!(!is_audio_mime("text/html"));
        assert!(!is_audio_mime("application/json"));
        assert!(!is_audio_mime("video/mp4"));
    }

    #[test]
    fn uri_of_each_variant() {
        let remote = MediaSource::Remote("https://example.com/a.mp3".into());
        assert_eq!(remote.uri(), "https://example.com/a.mp3");

        let local = MediaSource::Local {
            uri: "blob:moodify/1".into(),
            bytes: Bytes::from_static(b"ID3"),
            mime: "audio/mpeg".into(),
        };
        assert_eq!(local.uri(), "blob:moodify/1");
    }
}
