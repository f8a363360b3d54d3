//! Normalization of the API's loosely-shaped responses.
//!
//! The inference service has grown several spellings for the same fields
//! (`file_url` vs `url`, `track.name` vs `title`, ...). Everything here
//! takes the first non-empty candidate.

use moodify_core::TrackMetadata;
use reqwest::header::HeaderMap;
use serde_json::Value;

/// Title used when the API names nothing
pub const GENERATED_TITLE: &str = "Generated track";

/// Non-empty string at a dotted path
fn str_at<'a>(json: &'a Value, path: &str) -> Option<&'a str> {
    path.split('.')
        .try_fold(json, |node, key| node.get(key))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// First non-empty string among several paths
fn first_str<'a>(json: &'a Value, paths: &[&str]) -> Option<&'a str> {
    paths.iter().find_map(|path| str_at(json, path))
}

/// Reference to the audio file
pub fn file_url(json: &Value) -> Option<String> {
    first_str(json, &["file_url", "url"]).map(str::to_string)
}

/// Detected mood label
pub fn mood(json: &Value) -> Option<String> {
    first_str(json, &["mood", "emotion", "predicted_mood"]).map(str::to_string)
}

/// Error message the API reported, if any
pub fn api_error(json: &Value) -> Option<String> {
    match json.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Track title and artist, when the response names a track at all
pub fn track_descriptor(json: &Value) -> Option<(String, String)> {
    let title = first_str(json, &["track.name", "title"]);
    let artist = first_str(json, &["track.artist", "artist"]);
    if title.is_none() && artist.is_none() {
        return None;
    }
    Some((
        title.unwrap_or_default().to_string(),
        artist.unwrap_or_default().to_string(),
    ))
}

/// Display metadata from a JSON body
///
/// `track.album` may be a plain name or an object with `name` and
/// `images`; the first image doubles as the cover when no cover key is set.
pub fn metadata_from_json(json: &Value, fallback_title: &str, fallback_artist: &str) -> TrackMetadata {
    let title = first_str(json, &["track.name", "title"]).unwrap_or(fallback_title);
    let artist = first_str(json, &["track.artist", "artist"]).unwrap_or(fallback_artist);
    let album = first_str(json, &["track.album", "track.album.name", "album", "album.name"])
        .unwrap_or_default();
    let cover = first_str(json, &["cover", "artwork", "album_art"])
        .or_else(|| album_image(json))
        .unwrap_or_default();

    TrackMetadata::new(title)
        .with_artist(artist)
        .with_album(album)
        .with_cover(cover)
}

fn album_image(json: &Value) -> Option<&str> {
    json.pointer("/track/album/images/0/url")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Display metadata from `X-Track-*` headers
pub fn metadata_from_headers(
    headers: &HeaderMap,
    fallback_title: &str,
    fallback_artist: &str,
) -> TrackMetadata {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    TrackMetadata::new(header("x-track-title").unwrap_or(fallback_title))
        .with_artist(header("x-track-artist").unwrap_or(fallback_artist))
        .with_album(header("x-track-album").unwrap_or_default())
        .with_cover(header("x-track-cover").unwrap_or_default())
}

/// Lowercased content type of a response
pub fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    #[test]
    fn file_url_prefers_file_url() {
        let body = json!({"file_url": "https://a/1.mp3", "url": "https://a/2.mp3"});
        assert_eq!(file_url(&body).as_deref(), Some("https://a/1.mp3"));
        assert_eq!(
            file_url(&json!({"url": "https://a/2.mp3"})).as_deref(),
            Some("https://a/2.mp3")
        );
        assert_eq!(file_url(&json!({"file_url": ""})), None);
    }

    #[test]
    fn nested_track_wins_over_flat_keys() {
        let body = json!({
            "title": "Flat",
            "track": {"name": "Nested", "artist": "Someone", "album": "Record"},
        });
        let metadata = metadata_from_json(&body, GENERATED_TITLE, "");
        assert_eq!(metadata.title, "Nested");
        assert_eq!(metadata.artist, "Someone");
        assert_eq!(metadata.album, "Record");
        assert!(metadata.cover.is_none());
    }

    #[test]
    fn album_object_supplies_name_and_cover() {
        let body = json!({
            "track": {
                "name": "Song",
                "album": {"name": "LP", "images": [{"url": "https://img/1.jpg"}]},
            },
        });
        let metadata = metadata_from_json(&body, GENERATED_TITLE, "");
        assert_eq!(metadata.album, "LP");
        assert_eq!(metadata.cover.as_deref(), Some("https://img/1.jpg"));
    }

    #[test]
    fn defaults_when_nothing_named() {
        let metadata = metadata_from_json(&json!({}), GENERATED_TITLE, "");
        assert_eq!(metadata.title, "Generated track");
        assert_eq!(metadata.artist, "");
    }

    #[test]
    fn cover_aliases() {
        for key in ["cover", "artwork", "album_art"] {
            let mut body = serde_json::Map::new();
            body.insert(key.to_string(), json!("https://img/c.jpg"));
            let body = Value::Object(body);
            let metadata = metadata_from_json(&body, GENERATED_TITLE, "");
            assert_eq!(metadata.cover.as_deref(), Some("https://img/c.jpg"), "{key}");
        }
    }

    #[test]
    fn mood_aliases() {
        assert_eq!(mood(&json!({"emotion": "happy"})).as_deref(), Some("happy"));
        assert_eq!(mood(&json!({"predicted_mood": "sad"})).as_deref(), Some("sad"));
        assert_eq!(mood(&json!({})), None);
    }

    #[test]
    fn api_error_detection() {
        assert_eq!(api_error(&json!({"error": "not found"})).as_deref(), Some("not found"));
        assert_eq!(api_error(&json!({"error": null})), None);
        assert_eq!(api_error(&json!({"error": ""})), None);
        assert_eq!(api_error(&json!({})), None);
    }

    #[test]
    fn descriptor_needs_a_name() {
        assert_eq!(
            track_descriptor(&json!({"track": {"name": "Song", "artist": "Band"}})),
            Some(("Song".to_string(), "Band".to_string()))
        );
        assert_eq!(track_descriptor(&json!({"mood": "happy"})), None);
    }

    #[test]
    fn header_metadata_with_fallbacks() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Track-Title", HeaderValue::from_static("Streamed"));
        headers.insert("X-Track-Cover", HeaderValue::from_static("https://img/s.jpg"));

        let metadata = metadata_from_headers(&headers, GENERATED_TITLE, "Requested Artist");
        assert_eq!(metadata.title, "Streamed");
        assert_eq!(metadata.artist, "Requested Artist");
        assert_eq!(metadata.album, "");
        assert_eq!(metadata.cover.as_deref(), Some("https://img/s.jpg"));
    }
}
