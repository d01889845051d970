//! The collection: owner of every track and of the playlist registry.
//!
//! All attribute writes and membership mutations go through the collection,
//! which is what lets it raise change notifications consistently: a tag edit
//! notifies every playlist holding the track, a source mutation marks its
//! dependents dirty through their subscribed feeds, and a destroyed source is
//! observed by dependents as a disconnected channel rather than an error.
//!
//! Dynamic playlists recompute lazily: reading through [`Collection::items`]
//! refreshes the playlist (and, recursively, its sources — terminating
//! because source graphs are validated acyclic) before returning.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::Settings;
use crate::error::EngineError;
use crate::events::{ChangeEvent, PlayEvent, Subscribers};
use crate::playlist::{Derivation, HistoryList, Playlist, PlaylistId, SearchList, UpcomingList};
use crate::search::{Search, SearchResults, SearchSpec};
use crate::track::{Column, TrackData, TrackRef};

pub struct Collection {
    settings: Settings,
    tracks: HashMap<PathBuf, TrackRef>,
    playlists: BTreeMap<PlaylistId, Playlist>,
    next_id: u64,
    play_subs: Subscribers<PlayEvent>,
}

impl Collection {
    /// The root playlist: every known track, in scan/insertion order.
    pub const ROOT: PlaylistId = PlaylistId(0);

    pub fn new(settings: Settings) -> Self {
        let mut playlists = BTreeMap::new();
        playlists.insert(
            Self::ROOT,
            Playlist::new(Self::ROOT, "Collection", Derivation::Static, false),
        );
        Self {
            settings,
            tracks: HashMap::new(),
            playlists,
            next_id: 1,
            play_subs: Subscribers::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn pad_width(&self) -> usize {
        self.settings.search.track_number_width
    }

    // ---- tracks ---------------------------------------------------------

    /// Register a track, or refresh its snapshot if the path is already
    /// known. Either way every playlist holding the path is notified.
    pub fn add_track(&mut self, path: impl Into<PathBuf>, data: TrackData) -> TrackRef {
        let path = path.into();
        if let Some(existing) = self.tracks.get(&path).cloned() {
            existing.set_data(data);
            self.notify_holders(&existing);
            return existing;
        }

        let track = TrackRef::new(path.clone(), data);
        self.tracks.insert(path, track.clone());
        if let Some(root) = self.playlists.get_mut(&Self::ROOT) {
            root.push(track.clone());
            root.notify(ChangeEvent::Changed);
        }
        track
    }

    /// Replace a track's metadata snapshot after a tag re-read. The snapshot
    /// is shared, so every playlist sees the new values; each one holding the
    /// track is also notified.
    pub fn update_track(&mut self, path: &Path, data: TrackData) -> Result<(), EngineError> {
        let track = self
            .tracks
            .get(path)
            .cloned()
            .ok_or_else(|| EngineError::UnknownTrack(path.to_path_buf()))?;
        track.set_data(data);
        self.notify_holders(&track);
        Ok(())
    }

    /// Drop a track entirely: from the map, the root playlist and every
    /// other playlist referencing it, with pre-removal notifications.
    pub fn remove_track(&mut self, path: &Path) -> Result<(), EngineError> {
        let track = self
            .tracks
            .remove(path)
            .ok_or_else(|| EngineError::UnknownTrack(path.to_path_buf()))?;
        for pl in self.playlists.values_mut() {
            evict_track(pl, &track);
        }
        Ok(())
    }

    pub fn resolve(&self, path: &Path) -> Option<TrackRef> {
        self.tracks.get(path).cloned()
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    // ---- playlist registry ----------------------------------------------

    fn register(&mut self, playlist: Playlist) -> PlaylistId {
        let id = playlist.id();
        self.playlists.insert(id, playlist);
        id
    }

    fn allocate_id(&mut self) -> PlaylistId {
        let id = PlaylistId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn create_playlist(&mut self, name: impl Into<String>) -> PlaylistId {
        let id = self.allocate_id();
        self.register(Playlist::new(id, name, Derivation::Static, false))
    }

    /// Create a search playlist over the given search's sources. The list
    /// starts dirty and derives its membership on first read.
    pub fn create_search_playlist(
        &mut self,
        name: impl Into<String>,
        search: Search,
    ) -> Result<PlaylistId, EngineError> {
        for source in search.sources() {
            if !self.playlists.contains_key(source) {
                return Err(EngineError::UnknownPlaylist(*source));
            }
        }

        let id = self.allocate_id();
        let mut list = SearchList::new(search);
        for source in list.search().sources().to_vec() {
            if let Some(src) = self.playlists.get_mut(&source) {
                let rx = src.subscribe();
                list.attach_feed(source, rx);
            }
        }
        Ok(self.register(Playlist::new(id, name, Derivation::Search(list), false)))
    }

    /// Create the history playlist. Duplicates are allowed; entries arrive
    /// via play notifications, debounced per the configured window.
    pub fn create_history_playlist(&mut self, name: impl Into<String>) -> PlaylistId {
        let rx = self.play_subs.subscribe();
        let list = HistoryList::new(
            rx,
            Duration::from_millis(self.settings.history.debounce_ms),
            self.settings.history.capacity,
        );
        let id = self.allocate_id();
        self.register(Playlist::new(id, name, Derivation::History(list), true))
    }

    /// Create the play-queue playlist with the configured lookahead window.
    pub fn create_upcoming_playlist(&mut self, name: impl Into<String>) -> PlaylistId {
        let list = UpcomingList::new(self.settings.upcoming.lookahead);
        let id = self.allocate_id();
        self.register(Playlist::new(id, name, Derivation::Upcoming(list), true))
    }

    /// Destroy a playlist. Its subscribers observe the disconnect and drop
    /// it as a source; the sequence manager falls back on its own when its
    /// active playlist disappears.
    pub fn remove_playlist(&mut self, id: PlaylistId) -> Result<(), EngineError> {
        if id == Self::ROOT {
            return Err(EngineError::WrongKind {
                expected: "non-root",
            });
        }
        self.playlists
            .remove(&id)
            .map(|_| ())
            .ok_or(EngineError::UnknownPlaylist(id))
    }

    pub fn playlist(&self, id: PlaylistId) -> Result<&Playlist, EngineError> {
        self.playlists
            .get(&id)
            .ok_or(EngineError::UnknownPlaylist(id))
    }

    fn playlist_mut(&mut self, id: PlaylistId) -> Result<&mut Playlist, EngineError> {
        self.playlists
            .get_mut(&id)
            .ok_or(EngineError::UnknownPlaylist(id))
    }

    pub fn playlist_by_name(&self, name: &str) -> Option<&Playlist> {
        self.playlists.values().find(|pl| pl.name() == name)
    }

    pub fn playlist_ids(&self) -> Vec<PlaylistId> {
        self.playlists.keys().copied().collect()
    }

    pub fn rename_playlist(
        &mut self,
        id: PlaylistId,
        name: impl Into<String>,
    ) -> Result<(), EngineError> {
        self.playlist_mut(id)?.set_name(name);
        Ok(())
    }

    // ---- reads (lazy recomputation) -------------------------------------

    /// Membership snapshot, refreshing first if the playlist is dynamic and
    /// dirty. This is the read path the dirty-flag invariant talks about.
    pub fn items(&mut self, id: PlaylistId) -> Result<Vec<TrackRef>, EngineError> {
        self.refresh(id)?;
        Ok(self.playlist(id)?.tracks().to_vec())
    }

    /// Ordered path list for the persistence collaborator.
    pub fn item_paths(&mut self, id: PlaylistId) -> Result<Vec<PathBuf>, EngineError> {
        Ok(self
            .items(id)?
            .iter()
            .map(|t| t.path().to_path_buf())
            .collect())
    }

    pub fn refresh(&mut self, id: PlaylistId) -> Result<(), EngineError> {
        self.refresh_at(id, Instant::now())
    }

    /// Refresh with an explicit clock, recursively refreshing sources first.
    /// Terminates because source graphs are validated acyclic.
    pub fn refresh_at(&mut self, id: PlaylistId, now: Instant) -> Result<(), EngineError> {
        let sources = self.playlist(id)?.derivation().source_ids();
        for source in sources {
            if self.playlists.contains_key(&source) {
                self.refresh_at(source, now)?;
            }
        }

        let Some(mut pl) = self.playlists.remove(&id) else {
            return Err(EngineError::UnknownPlaylist(id));
        };
        match pl.derivation() {
            Derivation::Static => {}
            Derivation::Search(_) => self.refresh_search(&mut pl),
            Derivation::History(_) => refresh_history(&mut pl, now),
            Derivation::Upcoming(_) => self.refresh_upcoming(&mut pl),
        }
        self.playlists.insert(id, pl);
        Ok(())
    }

    fn refresh_search(&mut self, pl: &mut Playlist) {
        let search = {
            let Derivation::Search(list) = pl.derivation_mut() else {
                return;
            };
            list.drain_feeds();
            if !list.is_dirty() {
                return;
            }
            list.clear_dirty();
            list.note_recompute();
            list.search().clone()
        };

        let matched = self.matched_union(&search);
        if apply_diff(pl, matched) {
            debug!(playlist = %pl.id(), len = pl.len(), "search playlist recomputed");
            pl.notify(ChangeEvent::Changed);
        }
    }

    /// Every track matched by `search` in the union of its current source
    /// memberships, source order preserved, deduplicated by path.
    fn matched_union(&self, search: &Search) -> Vec<TrackRef> {
        let pad = self.pad_width();
        let mut seen: HashSet<TrackRef> = HashSet::new();
        let mut matched = Vec::new();
        for source in search.sources() {
            let Some(src) = self.playlists.get(source) else {
                continue;
            };
            for track in src.tracks() {
                if seen.insert(track.clone()) && search.evaluate(track, pad) {
                    matched.push(track.clone());
                }
            }
        }
        matched
    }

    fn refresh_upcoming(&mut self, pl: &mut Playlist) {
        let len = pl.len();
        let (seed, lookahead, manual_len) = {
            let Derivation::Upcoming(list) = pl.derivation_mut() else {
                return;
            };
            let manual_len = list.manual_len().min(len);
            list.set_manual_len(manual_len);
            if !list.needs_fill() {
                return;
            }
            list.mark_filled();
            // An upcoming seed iterating the queue itself would recurse;
            // refuse to enumerate it.
            let seed = list.seed().filter(|s| !s.is_upcoming()).cloned();
            (seed, list.lookahead(), manual_len)
        };

        // The lookahead tail is enumerated once per installed seed, from a
        // copy: the borrowed iterator itself stays put so it can be handed
        // back at its pre-override position.
        let mut tail = Vec::new();
        if let Some(mut it) = seed {
            while tail.len() < lookahead {
                match it.advance(self) {
                    Some(track) => tail.push(track),
                    None => break,
                }
            }
        }

        if pl.tracks()[manual_len..] != tail[..] {
            pl.tracks_mut().truncate(manual_len);
            pl.tracks_mut().extend(tail);
            pl.notify(ChangeEvent::Changed);
        }
    }

    // ---- search surface -------------------------------------------------

    /// Run a search against the full current membership of its sources and
    /// partition the corpus. O(sources × tracks × components); there is no
    /// index, which is why dynamic playlists defer this behind dirty flags.
    pub fn run_search(&mut self, search: &Search) -> Result<SearchResults, EngineError> {
        for source in search.sources().to_vec() {
            if self.playlists.contains_key(&source) {
                self.refresh(source)?;
            }
        }

        let pad = self.pad_width();
        let mut seen: HashSet<TrackRef> = HashSet::new();
        let mut results = SearchResults::default();
        for source in search.sources() {
            let Some(src) = self.playlists.get(source) else {
                continue;
            };
            for track in src.tracks() {
                if seen.insert(track.clone()) {
                    if search.evaluate(track, pad) {
                        results.matched.push(track.clone());
                    } else {
                        results.unmatched.push(track.clone());
                    }
                }
            }
        }
        Ok(results)
    }

    /// Replace a search playlist's search. Marks dirty only; recomputation
    /// waits for the next read.
    pub fn set_search(&mut self, id: PlaylistId, search: Search) -> Result<(), EngineError> {
        self.validate_sources(id, search.sources())?;

        let mut feeds = Vec::new();
        for source in search.sources().to_vec() {
            if let Some(src) = self.playlists.get_mut(&source) {
                feeds.push((source, src.subscribe()));
            }
        }

        let pl = self.playlist_mut(id)?;
        let Derivation::Search(list) = pl.derivation_mut() else {
            return Err(EngineError::WrongKind { expected: "search" });
        };
        list.set_search(search);
        list.clear_feeds();
        for (source, rx) in feeds {
            list.attach_feed(source, rx);
        }
        Ok(())
    }

    /// Replace only the source set, keeping components and mode.
    pub fn set_sources(
        &mut self,
        id: PlaylistId,
        sources: Vec<PlaylistId>,
    ) -> Result<(), EngineError> {
        let current = {
            let pl = self.playlist(id)?;
            let Derivation::Search(list) = pl.derivation() else {
                return Err(EngineError::WrongKind { expected: "search" });
            };
            list.search().clone()
        };
        let search = Search::new(current.components().to_vec(), current.mode(), sources);
        self.set_search(id, search)
    }

    /// The playlist's search in its persistence-facing form (source names
    /// instead of session-local ids).
    pub fn playlist_search(&self, id: PlaylistId) -> Result<SearchSpec, EngineError> {
        let pl = self.playlist(id)?;
        let Derivation::Search(list) = pl.derivation() else {
            return Err(EngineError::WrongKind { expected: "search" });
        };
        let search = list.search();
        let sources = search
            .sources()
            .iter()
            .filter_map(|s| self.playlists.get(s).map(|pl| pl.name().to_string()))
            .collect();
        Ok(SearchSpec {
            components: search.components().to_vec(),
            mode: search.mode(),
            sources,
        })
    }

    fn validate_sources(
        &self,
        id: PlaylistId,
        sources: &[PlaylistId],
    ) -> Result<(), EngineError> {
        for source in sources {
            if !self.playlists.contains_key(source) {
                return Err(EngineError::UnknownPlaylist(*source));
            }
        }
        // A playlist must never be its own source, directly or transitively.
        let mut stack: Vec<PlaylistId> = sources.to_vec();
        let mut seen: HashSet<PlaylistId> = HashSet::new();
        while let Some(next) = stack.pop() {
            if next == id {
                return Err(EngineError::CyclicSources(id));
            }
            if seen.insert(next) {
                if let Some(pl) = self.playlists.get(&next) {
                    stack.extend(pl.derivation().source_ids());
                }
            }
        }
        Ok(())
    }

    // ---- static playlist mutation ---------------------------------------

    pub fn append_tracks(
        &mut self,
        id: PlaylistId,
        tracks: Vec<TrackRef>,
    ) -> Result<(), EngineError> {
        let pl = self.playlist_mut(id)?;
        if !matches!(pl.derivation(), Derivation::Static) {
            return Err(EngineError::WrongKind { expected: "static" });
        }
        let mut changed = false;
        for track in tracks {
            changed |= pl.push(track);
        }
        if changed {
            pl.notify(ChangeEvent::Changed);
        }
        Ok(())
    }

    pub fn remove_at(
        &mut self,
        id: PlaylistId,
        index: usize,
    ) -> Result<Option<TrackRef>, EngineError> {
        let pl = self.playlist_mut(id)?;
        if !matches!(pl.derivation(), Derivation::Static) {
            return Err(EngineError::WrongKind { expected: "static" });
        }
        let removed = pl.remove_at(index);
        if removed.is_some() {
            pl.notify(ChangeEvent::Changed);
        }
        Ok(removed)
    }

    pub fn clear_playlist(&mut self, id: PlaylistId) -> Result<(), EngineError> {
        let pl = self.playlist_mut(id)?;
        if !matches!(pl.derivation(), Derivation::Static) {
            return Err(EngineError::WrongKind { expected: "static" });
        }
        if !pl.is_empty() {
            pl.clear_tracks();
            pl.notify(ChangeEvent::Changed);
        }
        Ok(())
    }

    /// Override insertion order with a sort key. Numeric columns compare
    /// numerically, everything else case-insensitively.
    pub fn sort_playlist(
        &mut self,
        id: PlaylistId,
        column: Column,
        ascending: bool,
    ) -> Result<(), EngineError> {
        let pl = self.playlist_mut(id)?;
        if !matches!(pl.derivation(), Derivation::Static) {
            return Err(EngineError::WrongKind { expected: "static" });
        }
        pl.tracks_mut().sort_by(|a, b| {
            let ord = compare_attribute(a, b, column);
            if ascending { ord } else { ord.reverse() }
        });
        pl.notify(ChangeEvent::Changed);
        Ok(())
    }

    // ---- play queue surface ---------------------------------------------

    /// Queue tracks at the tail of the manual section; they still play
    /// before anything from the lookahead tail.
    pub fn append_items(
        &mut self,
        id: PlaylistId,
        tracks: Vec<TrackRef>,
    ) -> Result<(), EngineError> {
        let pl = self.playlist_mut(id)?;
        let Derivation::Upcoming(list) = pl.derivation_mut() else {
            return Err(EngineError::WrongKind { expected: "upcoming" });
        };
        let mut at = list.manual_len();
        let added = tracks.len();
        list.set_manual_len(at + added);
        for track in tracks {
            pl.insert(at, track);
            at += 1;
        }
        if added > 0 {
            pl.notify(ChangeEvent::Changed);
        }
        Ok(())
    }

    /// Resolve paths through the collection and queue whatever resolves.
    /// Unknown paths are skipped, not errors.
    pub fn add_files(&mut self, id: PlaylistId, paths: &[PathBuf]) -> Result<(), EngineError> {
        let mut tracks = Vec::new();
        for path in paths {
            match self.resolve(path) {
                Some(track) => tracks.push(track),
                None => warn!(path = %path.display(), "path not in collection, skipping"),
            }
        }
        self.append_items(id, tracks)
    }

    /// Splice a track to the very front of the queue, ahead of everything.
    pub fn queue_front(&mut self, id: PlaylistId, track: TrackRef) -> Result<(), EngineError> {
        let pl = self.playlist_mut(id)?;
        let Derivation::Upcoming(list) = pl.derivation_mut() else {
            return Err(EngineError::WrongKind { expected: "upcoming" });
        };
        list.set_manual_len(list.manual_len() + 1);
        pl.insert(0, track);
        pl.notify(ChangeEvent::Changed);
        Ok(())
    }

    /// Remove the first queued occurrence of `track`, because it started
    /// playing out of turn. Returns false when it was not queued.
    pub(crate) fn consume_queued(&mut self, id: PlaylistId, track: &TrackRef) -> bool {
        let Some(pl) = self.playlists.get_mut(&id) else {
            return false;
        };
        if !matches!(pl.derivation(), Derivation::Upcoming(_)) {
            return false;
        }
        let Some(pos) = pl.position(track) else {
            return false;
        };
        pl.remove_at(pos);
        if let Derivation::Upcoming(list) = pl.derivation_mut() {
            if pos < list.manual_len() {
                list.set_manual_len(list.manual_len() - 1);
            }
        }
        pl.notify(ChangeEvent::Changed);
        true
    }

    /// Consume the front of the queue.
    pub(crate) fn pop_upcoming(&mut self, id: PlaylistId) -> Option<TrackRef> {
        let pl = self.playlists.get_mut(&id)?;
        let Derivation::Upcoming(_) = pl.derivation() else {
            return None;
        };
        let track = pl.remove_at(0)?;
        if let Derivation::Upcoming(list) = pl.derivation_mut() {
            let manual = list.manual_len();
            if manual > 0 {
                list.set_manual_len(manual - 1);
            }
        }
        pl.notify(ChangeEvent::Changed);
        Some(track)
    }

    pub(crate) fn set_upcoming_seed(
        &mut self,
        id: PlaylistId,
        seed: crate::sequence::SequenceIterator,
    ) -> Result<(), EngineError> {
        let pl = self.playlist_mut(id)?;
        let Derivation::Upcoming(list) = pl.derivation_mut() else {
            return Err(EngineError::WrongKind { expected: "upcoming" });
        };
        list.set_seed(seed);
        Ok(())
    }

    pub(crate) fn take_upcoming_seed(
        &mut self,
        id: PlaylistId,
    ) -> Result<Option<crate::sequence::SequenceIterator>, EngineError> {
        let pl = self.playlist_mut(id)?;
        let (seed, manual_len) = {
            let Derivation::Upcoming(list) = pl.derivation_mut() else {
                return Err(EngineError::WrongKind { expected: "upcoming" });
            };
            (list.take_seed(), list.manual_len())
        };
        // Any unconsumed lookahead described the departing iterator; only
        // the manual prefix survives the hand-back.
        if pl.len() > manual_len {
            pl.tracks_mut().truncate(manual_len);
            pl.notify(ChangeEvent::Changed);
        }
        Ok(seed)
    }

    // ---- play notifications ---------------------------------------------

    /// Broadcast that playback moved to `track` (or stopped). Feeds the
    /// now-playing highlight on every playlist and, for actual tracks, the
    /// history debounce.
    pub fn note_playing(&mut self, track: Option<TrackRef>, at: Instant) {
        for pl in self.playlists.values_mut() {
            pl.notify(ChangeEvent::PlayingChanged(track.clone()));
        }
        if let Some(track) = track {
            self.play_subs.notify(PlayEvent { track, at });
        }
    }

    // ---- persistence surface --------------------------------------------

    /// Rebuild a static playlist from a saved path list. Paths that no
    /// longer resolve are skipped with a warning.
    pub fn restore_playlist(&mut self, name: impl Into<String>, paths: &[PathBuf]) -> PlaylistId {
        let id = self.create_playlist(name);
        let tracks = self.resolve_all(paths);
        if let Ok(pl) = self.playlist_mut(id) {
            for track in tracks {
                pl.push(track);
            }
        }
        id
    }

    /// Rebuild a search playlist from its saved search and membership
    /// without re-deriving: the restored list starts clean, and only goes
    /// dirty again when a source actually changes.
    pub fn restore_search_playlist(
        &mut self,
        name: impl Into<String>,
        spec: &SearchSpec,
        paths: &[PathBuf],
    ) -> Result<PlaylistId, EngineError> {
        let mut sources = Vec::new();
        for source_name in &spec.sources {
            match self.playlist_by_name(source_name) {
                Some(pl) => sources.push(pl.id()),
                None => warn!(source = %source_name, "saved search source missing, dropping"),
            }
        }

        let search = Search::new(spec.components.clone(), spec.mode, sources);
        let id = self.create_search_playlist(name, search)?;
        let tracks = self.resolve_all(paths);
        let pl = self.playlist_mut(id)?;
        for track in tracks {
            pl.push(track);
        }
        if let Derivation::Search(list) = pl.derivation_mut() {
            list.clear_dirty();
        }
        Ok(id)
    }

    fn resolve_all(&self, paths: &[PathBuf]) -> Vec<TrackRef> {
        let mut tracks = Vec::new();
        for path in paths {
            match self.resolve(path) {
                Some(track) => tracks.push(track),
                None => warn!(path = %path.display(), "saved track missing, skipping"),
            }
        }
        tracks
    }

    fn notify_holders(&mut self, track: &TrackRef) {
        for pl in self.playlists.values_mut() {
            if pl.contains(track) {
                pl.notify(ChangeEvent::Changed);
            }
        }
    }
}

/// Remove every occurrence of `track` from `pl`, keeping the upcoming manual
/// prefix length in step.
fn evict_track(pl: &mut Playlist, track: &TrackRef) {
    let manual_hits = match pl.derivation() {
        Derivation::Upcoming(list) => pl.tracks()[..list.manual_len().min(pl.len())]
            .iter()
            .filter(|t| *t == track)
            .count(),
        _ => 0,
    };

    let removed = pl.remove_track(track);
    if removed == 0 {
        return;
    }
    if let Derivation::Upcoming(list) = pl.derivation_mut() {
        list.set_manual_len(list.manual_len().saturating_sub(manual_hits));
    }
    pl.notify(ChangeEvent::Changed);
}

/// Bring a search playlist's membership in line with `matched`: entries no
/// longer matched are removed (one pre-removal notification each), survivors
/// keep their relative order, and new matches append. Returns whether
/// anything changed.
fn apply_diff(pl: &mut Playlist, matched: Vec<TrackRef>) -> bool {
    let matched_set: HashSet<TrackRef> = matched.iter().cloned().collect();
    let mut changed = false;

    for track in pl.tracks().to_vec() {
        if !matched_set.contains(&track) {
            pl.remove_track(&track);
            changed = true;
        }
    }

    let existing: HashSet<TrackRef> = pl.tracks().iter().cloned().collect();
    for track in matched {
        if !existing.contains(&track) {
            pl.push(track);
            changed = true;
        }
    }
    changed
}

fn refresh_history(pl: &mut Playlist, now: Instant) {
    let (due, capacity) = {
        let Derivation::History(list) = pl.derivation_mut() else {
            return;
        };
        list.drain_events();
        (list.take_due(now), list.capacity())
    };
    if due.is_empty() {
        return;
    }

    for track in due {
        pl.push(track);
    }
    while pl.len() > capacity {
        pl.remove_at(0);
    }
    pl.notify(ChangeEvent::Changed);
}

fn compare_attribute(a: &TrackRef, b: &TrackRef, column: Column) -> std::cmp::Ordering {
    let (va, vb) = (a.attribute(column), b.attribute(column));
    match column {
        Column::Track | Column::Year | Column::Length | Column::Bitrate => {
            let na: u64 = va.parse().unwrap_or(0);
            let nb: u64 = vb.parse().unwrap_or(0);
            na.cmp(&nb)
        }
        _ => va.to_lowercase().cmp(&vb.to_lowercase()),
    }
}
