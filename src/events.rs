//! Change notification plumbing.
//!
//! Every playlist exposes a publish/subscribe channel: `subscribe` hands the
//! caller a plain `mpsc::Receiver`, and dropping that receiver is the only
//! unsubscribe step needed — dead subscribers are pruned on the next send.
//! Dynamic playlists use the same channels to discover that a source changed
//! (coarse dirty marking) or disappeared entirely (`Disconnected` on the
//! receiver side).

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;

use crate::track::TrackRef;

/// Notification raised by a playlist to its subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// Membership or attribute data changed. Coarse: listeners re-read.
    Changed,
    /// This track is about to be removed from the playlist. Emitted before
    /// the removal so dependents can drop any "now playing" state for it.
    Removing(TrackRef),
    /// The currently-playing item changed (None = playback stopped).
    PlayingChanged(Option<TrackRef>),
}

/// "This track started playing", stamped with the time it happened so the
/// history debounce can coalesce rapid skips.
#[derive(Debug, Clone)]
pub struct PlayEvent {
    pub track: TrackRef,
    pub at: Instant,
}

/// Subscriber list for one event type. Sending clones the event to every
/// live subscriber and drops the ones whose receiver is gone.
#[derive(Debug, Default)]
pub struct Subscribers<E: Clone> {
    senders: Vec<Sender<E>>,
}

impl<E: Clone> Subscribers<E> {
    pub fn new() -> Self {
        Self { senders: Vec::new() }
    }

    pub fn subscribe(&mut self) -> Receiver<E> {
        let (tx, rx) = mpsc::channel();
        self.senders.push(tx);
        rx
    }

    pub fn notify(&mut self, event: E) {
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}
