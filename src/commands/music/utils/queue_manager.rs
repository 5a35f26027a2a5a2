use std::collections::VecDeque;

use crate::commands::music::audio_sources::track_metadata::Track;

/// The pending tracks, the current track and the paused flag.
///
/// Holds no I/O. `MusicManager` owns the only instance and serializes
/// access to it.
#[derive(Debug, Default)]
pub struct QueueManager {
    // Pending tracks, head plays next
    queue: VecDeque<Track>,
    // The track audio is being streamed for
    current: Option<Track>,
    paused: bool,
}

impl QueueManager {
    /// Create a new, idle queue manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a track to the tail. Returns its 1-based position in the queue.
    pub fn enqueue(&mut self, track: Track) -> usize {
        self.queue.push_back(track);
        self.queue.len()
    }

    /// Pop the head and make it current. An empty queue leaves nothing current.
    pub fn dequeue_next(&mut self) -> Option<Track> {
        self.paused = false;
        self.current = self.queue.pop_front();
        self.current.clone()
    }

    /// Drop the current track, returning it.
    pub fn finish_current(&mut self) -> Option<Track> {
        self.paused = false;
        self.current.take()
    }

    /// Empty the queue and forget the current track.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.current = None;
        self.paused = false;
    }

    pub fn current(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    /// The pending tracks in play order, excluding the current one.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.queue.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Nothing is current.
    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Only takes effect while a track is current.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused && self.current.is_some();
    }
}
