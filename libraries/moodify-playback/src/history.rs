//! Playback history tracking
//!
//! Maintains a bounded history of played tracks for the "previously played"
//! list and history navigation.

use moodify_core::{HistoryEntry, Track};
use std::collections::VecDeque;

/// Playback history with bounded size
///
/// Entries are kept newest first. When full, the oldest entry is discarded.
#[derive(Debug, Clone)]
pub struct History {
    /// History buffer (most recent = front)
    entries: VecDeque<HistoryEntry>,

    /// Maximum history size
    max_size: usize,
}

impl History {
    /// Create new history with specified maximum size
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Record a track as played now
    pub fn record(&mut self, track: Track) {
        self.push(HistoryEntry::now(track));
    }

    /// Add an entry as the newest
    ///
    /// If history is full, the oldest entry is discarded
    pub fn push(&mut self, entry: HistoryEntry) {
        if self.max_size == 0 {
            return;
        }
        self.entries.push_front(entry);
        self.entries.truncate(self.max_size);
    }

    /// Entry at `index` (0 = most recent)
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Index of the most recent entry for `src`
    pub fn position_of(&self, src: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.track.src() == src)
    }

    /// All entries, newest first
    pub fn get_all(&self) -> Vec<&HistoryEntry> {
        self.entries.iter().collect()
    }

    /// Get number of entries in history
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get maximum history size
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodify_core::TrackMetadata;

    fn create_test_track(id: &str) -> Track {
        Track::new(
            TrackMetadata::new(format!("Track {id}")).with_artist("Test Artist"),
            format!("https://cdn.example.com/{id}.mp3"),
        )
    }

    #[test]
    fn create_history() {
        let history = History::new(10);
        assert_eq!(history.max_size(), 10);
        assert_eq!(history.len(), 0);
        assert!(history.is_empty());
    }

    #[test]
    fn newest_first() {
        let mut history = History::new(10);
        history.record(create_test_track("1"));
        history.record(create_test_track("2"));
        history.record(create_test_track("3"));

        let all = history.get_all();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].track.title(), "Track 3");
        assert_eq!(all[1].track.title(), "Track 2");
        assert_eq!(all[2].track.title(), "Track 1");
    }

    #[test]
    fn history_bounded() {
        let mut history = History::new(3);

        for i in 1..=4 {
            history.record(create_test_track(&i.to_string()));
        }
        assert_eq!(history.len(), 3);

        // Oldest (Track 1) should be gone
        let all = history.get_all();
        assert_eq!(all[0].track.title(), "Track 4");
        assert_eq!(all[2].track.title(), "Track 2");
        assert!(history.position_of("https://cdn.example.com/1.mp3").is_none());
    }

    #[test]
    fn twenty_five_plays_keep_twenty() {
        let mut history = History::default();
        for i in 1..=25 {
            history.record(create_test_track(&i.to_string()));
        }

        assert_eq!(history.len(), 20);
        assert_eq!(history.get(0).unwrap().track.title(), "Track 25");
        assert_eq!(history.get(19).unwrap().track.title(), "Track 6");
    }

    #[test]
    fn played_at_is_non_decreasing_towards_front() {
        let mut history = History::new(5);
        history.record(create_test_track("1"));
        history.record(create_test_track("2"));

        let all = history.get_all();
        assert!(all[0].played_at >= all[1].played_at);
    }

    #[test]
    fn position_of_finds_most_recent() {
        let mut history = History::new(5);
        history.record(create_test_track("a"));
        history.record(create_test_track("b"));
        history.record(create_test_track("a"));

        assert_eq!(history.position_of("https://cdn.example.com/a.mp3"), Some(0));
        assert_eq!(history.position_of("https://cdn.example.com/b.mp3"), Some(1));
        assert_eq!(history.position_of("https://cdn.example.com/zzz.mp3"), None);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut history = History::new(0);
        history.record(create_test_track("1"));
        assert!(history.is_empty());
    }
}
