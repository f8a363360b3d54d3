//! Upcoming-track queue
//!
//! Plain FIFO of tracks waiting for the active track to end. Entries can be
//! promoted out of order (`play_now`) or discarded (`remove`); nothing else
//! takes an entry out.

use moodify_core::Track;
use std::collections::VecDeque;

/// FIFO of pending tracks
///
/// ```text
/// Currently Playing: Track A
/// ─────────────────────────────
/// Queue (head first):
///   0. Track B
///   1. Track C
/// ```
#[derive(Debug, Clone, Default)]
pub struct Queue {
    entries: VecDeque<Track>,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a track to the tail
    ///
    /// Returns the position the track landed at.
    pub fn enqueue(&mut self, track: Track) -> usize {
        self.entries.push_back(track);
        self.entries.len() - 1
    }

    /// Remove and return the head
    pub fn dequeue_head(&mut self) -> Option<Track> {
        self.entries.pop_front()
    }

    /// Take the entry at `index` out of order so it can play now
    pub fn play_now(&mut self, index: usize) -> Option<Track> {
        self.entries.remove(index)
    }

    /// Discard the entry at `index` without playing it
    ///
    /// Returns the removed track if successful
    pub fn remove(&mut self, index: usize) -> Option<Track> {
        self.entries.remove(index)
    }

    /// Whether any entry has the given source
    pub fn contains_src(&self, src: &str) -> bool {
        self.entries.iter().any(|t| t.src() == src)
    }

    /// Peek at the head without removing it
    pub fn peek_head(&self) -> Option<&Track> {
        self.entries.front()
    }

    /// Get all tracks in playing order
    pub fn get_all(&self) -> Vec<&Track> {
        self.entries.iter().collect()
    }

    /// Get track at index
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.entries.get(index)
    }

    /// Total number of tracks in queue
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
