use std::collections::VecDeque;

use super::track::TrackRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("queue is full ({capacity} entries)")]
pub struct QueueFull {
    pub capacity: usize,
}

/// Bounded FIFO of pending requests for one guild, plus its repeat flag.
///
/// `epoch` is bumped by every [`GuildQueue::drain_all`]; the playback loop
/// compares it before and after a track so a `stop` issued mid-song keeps the
/// finished track from being re-appended under repeat.
#[derive(Debug)]
pub struct GuildQueue {
    tracks: VecDeque<TrackRequest>,
    capacity: usize,
    repeat: bool,
    epoch: u64,
}

impl GuildQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            tracks: VecDeque::new(),
            capacity,
            repeat: false,
            epoch: 0,
        }
    }

    pub fn enqueue(&mut self, track: TrackRequest) -> Result<(), QueueFull> {
        if self.tracks.len() >= self.capacity {
            return Err(QueueFull {
                capacity: self.capacity,
            });
        }
        self.tracks.push_back(track);
        Ok(())
    }

    pub fn dequeue(&mut self) -> Option<TrackRequest> {
        self.tracks.pop_front()
    }

    /// Removes every pending entry. The track currently playing is not touched.
    pub fn drain_all(&mut self) -> usize {
        let drained = self.tracks.len();
        self.tracks.clear();
        self.epoch += 1;
        drained
    }

    pub fn toggle_repeat(&mut self) -> bool {
        self.repeat = !self.repeat;
        self.repeat
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Puts a finished track back at the tail. Used by repeat mode only, so
    /// a full queue silently drops it rather than failing the loop.
    pub fn requeue(&mut self, track: TrackRequest) -> bool {
        self.enqueue(track).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackRequest> {
        self.tracks.iter()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
