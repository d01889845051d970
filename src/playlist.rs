//! Playlists and their derivation variants.
//!
//! A [`Playlist`] is an ordered, duplicate-controlled list of track
//! references with a change-notification channel. Derived playlists carry a
//! [`Derivation`] variant — a closed enum rather than open subclassing — and
//! are recomputed lazily by the collection when read while dirty.

mod history;
mod upcoming;

pub use history::HistoryList;
pub use upcoming::UpcomingList;

use std::fmt;
use std::sync::mpsc::{Receiver, TryRecvError};

use tracing::{debug, warn};

use crate::events::{ChangeEvent, Subscribers};
use crate::search::Search;
use crate::track::TrackRef;

/// Session-local playlist identifier. Id 0 is always the collection's root
/// playlist holding every known track.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaylistId(pub(crate) u64);

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a playlist's membership is derived.
#[derive(Debug)]
pub enum Derivation {
    /// Membership is whatever was explicitly added.
    Static,
    /// Membership is a search result over the union of source playlists.
    Search(SearchList),
    /// Membership is appended play history, debounced.
    History(HistoryList),
    /// Membership is the play queue: manual entries plus a lookahead window.
    Upcoming(UpcomingList),
}

impl Derivation {
    pub(crate) fn source_ids(&self) -> Vec<PlaylistId> {
        match self {
            Derivation::Static | Derivation::History(_) | Derivation::Upcoming(_) => Vec::new(),
            Derivation::Search(list) => list.search.sources().to_vec(),
        }
    }
}

/// An ordered collection of track references.
#[derive(Debug)]
pub struct Playlist {
    id: PlaylistId,
    name: String,
    tracks: Vec<TrackRef>,
    allow_duplicates: bool,
    derivation: Derivation,
    subscribers: Subscribers<ChangeEvent>,
}

impl Playlist {
    pub(crate) fn new(
        id: PlaylistId,
        name: impl Into<String>,
        derivation: Derivation,
        allow_duplicates: bool,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            tracks: Vec::new(),
            allow_duplicates,
            derivation,
            subscribers: Subscribers::new(),
        }
    }

    pub fn id(&self) -> PlaylistId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Current membership, in order. For dynamic playlists prefer
    /// [`Collection::items`](crate::collection::Collection::items), which
    /// refreshes first; this accessor returns whatever was last computed.
    pub fn tracks(&self) -> &[TrackRef] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn contains(&self, track: &TrackRef) -> bool {
        self.tracks.contains(track)
    }

    pub fn position(&self, track: &TrackRef) -> Option<usize> {
        self.tracks.iter().position(|t| t == track)
    }

    pub fn derivation(&self) -> &Derivation {
        &self.derivation
    }

    pub(crate) fn derivation_mut(&mut self) -> &mut Derivation {
        &mut self.derivation
    }

    /// Subscribe to this playlist's change events. Dropping the receiver is
    /// the unsubscribe; the sender side is pruned on the next notification.
    pub fn subscribe(&mut self) -> Receiver<ChangeEvent> {
        self.subscribers.subscribe()
    }

    pub(crate) fn notify(&mut self, event: ChangeEvent) {
        self.subscribers.notify(event);
    }

    /// Append respecting the duplicate policy. Returns false when the track
    /// was already present and duplicates are not allowed.
    pub(crate) fn push(&mut self, track: TrackRef) -> bool {
        if !self.allow_duplicates && self.contains(&track) {
            return false;
        }
        self.tracks.push(track);
        true
    }

    pub(crate) fn insert(&mut self, index: usize, track: TrackRef) -> bool {
        if !self.allow_duplicates && self.contains(&track) {
            return false;
        }
        self.tracks.insert(index.min(self.tracks.len()), track);
        true
    }

    /// Remove the entry at `index`, emitting the pre-removal notification.
    pub(crate) fn remove_at(&mut self, index: usize) -> Option<TrackRef> {
        if index >= self.tracks.len() {
            return None;
        }
        let track = self.tracks[index].clone();
        self.notify(ChangeEvent::Removing(track.clone()));
        self.tracks.remove(index);
        Some(track)
    }

    /// Remove every occurrence of `track`, emitting one pre-removal
    /// notification per occurrence. Returns how many entries were removed.
    pub(crate) fn remove_track(&mut self, track: &TrackRef) -> usize {
        let mut removed = 0;
        while let Some(index) = self.position(track) {
            self.notify(ChangeEvent::Removing(track.clone()));
            self.tracks.remove(index);
            removed += 1;
        }
        removed
    }

    pub(crate) fn clear_tracks(&mut self) {
        for track in self.tracks.clone() {
            self.notify(ChangeEvent::Removing(track));
        }
        self.tracks.clear();
    }

    pub(crate) fn tracks_mut(&mut self) -> &mut Vec<TrackRef> {
        &mut self.tracks
    }
}

/// Derivation state for a search playlist: the search itself, a change feed
/// per source, and the dirty flag.
#[derive(Debug)]
pub struct SearchList {
    search: Search,
    feeds: Vec<SourceFeed>,
    dirty: bool,
    recomputes: u64,
}

#[derive(Debug)]
struct SourceFeed {
    source: PlaylistId,
    rx: Receiver<ChangeEvent>,
}

impl SearchList {
    pub(crate) fn new(search: Search) -> Self {
        Self {
            search,
            feeds: Vec::new(),
            dirty: true,
            recomputes: 0,
        }
    }

    pub fn search(&self) -> &Search {
        &self.search
    }

    /// Replace the search. Marks dirty; recomputation is deferred to the
    /// next read, writes to the derivation rule never recompute eagerly.
    pub(crate) fn set_search(&mut self, search: Search) {
        self.search = search;
        self.dirty = true;
    }

    pub(crate) fn attach_feed(&mut self, source: PlaylistId, rx: Receiver<ChangeEvent>) {
        self.feeds.push(SourceFeed { source, rx });
    }

    pub(crate) fn clear_feeds(&mut self) {
        self.feeds.clear();
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// How many times this list has been recomputed. Dirty-flag idempotence
    /// is observable through this counter.
    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }

    pub(crate) fn note_recompute(&mut self) {
        self.recomputes += 1;
    }

    /// Drain all source feeds, setting the dirty flag if anything changed.
    /// A disconnected feed means its source playlist was destroyed: the
    /// source is dropped from the search rather than treated as an error.
    pub(crate) fn drain_feeds(&mut self) {
        let mut dead: Vec<PlaylistId> = Vec::new();
        for feed in &self.feeds {
            loop {
                match feed.rx.try_recv() {
                    Ok(ChangeEvent::Changed) | Ok(ChangeEvent::Removing(_)) => {
                        self.dirty = true;
                    }
                    // Now-playing transitions don't affect search membership.
                    Ok(ChangeEvent::PlayingChanged(_)) => {}
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        dead.push(feed.source);
                        break;
                    }
                }
            }
        }

        if !dead.is_empty() {
            warn!(sources = ?dead, "search sources destroyed, dropping them");
            self.feeds.retain(|f| !dead.contains(&f.source));
            self.search.sources_mut().retain(|s| !dead.contains(s));
            self.dirty = true;
        }

        if self.dirty {
            debug!("search list marked dirty");
        }
    }
}

#[cfg(test)]
mod tests;
