/// Domain types for Moodify
mod media;
mod player;
mod track;

pub use media::{is_audio_mime, MediaSource};
pub use player::{PlayerErrorKind, PlayerNotification};
pub use track::{HistoryEntry, Track, TrackMetadata, LOCAL_SCHEME};
