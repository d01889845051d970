use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

use crate::events::PlayEvent;
use crate::track::TrackRef;

/// Derivation state for the history playlist.
///
/// History does not filter; it appends one entry per track that actually got
/// listened to. "Actually" is approximated with a debounce: a play
/// notification only commits after `window` has elapsed with no newer
/// notification, so rapid skip/seek sequences collapse into a single entry
/// for the track the user landed on. An entry whose window has already run
/// out by the time the next notification arrives is committed, not dropped,
/// so infrequent reads never lose listened tracks.
#[derive(Debug)]
pub struct HistoryList {
    rx: Receiver<PlayEvent>,
    /// Entries that survived their debounce window, awaiting the next read.
    committed: Vec<TrackRef>,
    pending: Option<Pending>,
    window: Duration,
    capacity: usize,
}

#[derive(Debug)]
struct Pending {
    track: TrackRef,
    deadline: Instant,
}

impl HistoryList {
    pub(crate) fn new(rx: Receiver<PlayEvent>, window: Duration, capacity: usize) -> Self {
        Self {
            rx,
            committed: Vec::new(),
            pending: None,
            window,
            capacity,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record a play notification. A pending entry whose deadline already
    /// passed before this event commits; one still inside its window is
    /// replaced outright, it never made it past the debounce.
    pub(crate) fn note(&mut self, track: TrackRef, at: Instant) {
        if self.pending.as_ref().is_some_and(|p| p.deadline <= at) {
            if let Some(p) = self.pending.take() {
                self.committed.push(p.track);
            }
        }
        self.pending = Some(Pending {
            track,
            deadline: at + self.window,
        });
    }

    /// Every entry ready to enter history: all previously committed ones,
    /// plus the pending entry if its debounce window has fully elapsed.
    pub(crate) fn take_due(&mut self, now: Instant) -> Vec<TrackRef> {
        let mut due = std::mem::take(&mut self.committed);
        if self.pending.as_ref().is_some_and(|p| p.deadline <= now) {
            due.extend(self.pending.take().map(|p| p.track));
        }
        due
    }

    /// Pull queued play events into the pending slot. The play channel's
    /// sender lives as long as the collection, so disconnect only happens
    /// during teardown and is ignored.
    pub(crate) fn drain_events(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.note(event.track, event.at),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }
}
