//! The sequence manager: the single arbiter of what plays next.
//!
//! One `SequenceManager` exists per engine, created at startup and passed
//! explicitly to everything that needs it — there is no hidden global. It
//! holds exactly one active [`SequenceIterator`] plus the state for the
//! take/install override protocol the play queue uses to temporarily hijack
//! sequencing and later restore it, position intact.

use std::time::Instant;

use tracing::{debug, warn};

use crate::collection::Collection;
use crate::config::Settings;
use crate::error::EngineError;
use crate::playlist::PlaylistId;
use crate::sequence::{SequenceIterator, StrategyKind};
use crate::track::TrackRef;

pub struct SequenceManager {
    /// `None` only while an iterator has been taken and not yet reinstalled.
    active: Option<SequenceIterator>,
    /// The play-queue playlist currently overriding sequencing, if any.
    override_source: Option<PlaylistId>,
    /// The playlist considered "current" for UI purposes.
    current_playlist: PlaylistId,
    default_strategy: StrategyKind,
    default_loop: bool,
}

impl SequenceManager {
    /// A manager whose initial iterator runs over the whole collection with
    /// the configured default strategy.
    pub fn new(settings: &Settings) -> Self {
        let default_strategy = settings.playback.strategy.into();
        let default_loop = settings.playback.loop_at_end;
        Self {
            active: Some(SequenceIterator::new(
                default_strategy,
                Collection::ROOT,
                default_loop,
            )),
            override_source: None,
            current_playlist: Collection::ROOT,
            default_strategy,
            default_loop,
        }
    }

    fn default_iterator(&self) -> SequenceIterator {
        SequenceIterator::new(self.default_strategy, Collection::ROOT, self.default_loop)
    }

    /// The iterator consulted by `next_item`/`previous_item`. Repairs an
    /// unpaired take by falling back to the default, so sequencing never
    /// dead-ends on a protocol violation.
    fn active_mut(&mut self) -> &mut SequenceIterator {
        if self.active.is_none() {
            warn!("no active iterator (unbalanced take?), installing default");
        }
        let fallback = self.default_iterator();
        self.active.get_or_insert(fallback)
    }

    // ---- iterator ownership ---------------------------------------------

    /// Replace the active iterator. The previous one is discarded unless the
    /// caller retained it (see [`Self::take_iterator`]).
    pub fn install_iterator(&mut self, iterator: SequenceIterator) {
        self.active = Some(iterator);
    }

    /// Take the active iterator, transferring ownership to the caller, who
    /// must eventually reinstall one. A second take before that reinstall is
    /// a protocol violation: rejected with `None`, asserted in debug builds.
    pub fn take_iterator(&mut self) -> Option<SequenceIterator> {
        if self.active.is_none() {
            debug_assert!(false, "take_iterator while already taken");
            warn!("take_iterator while already taken, ignoring");
            return None;
        }
        self.active.take()
    }

    /// Run `scope` with `iterator` installed, restoring the previous
    /// iterator (and with it the previous position) on every exit path.
    pub fn with_override<R>(
        &mut self,
        iterator: SequenceIterator,
        coll: &mut Collection,
        scope: impl FnOnce(&mut Self, &mut Collection) -> R,
    ) -> R {
        let saved = self.active.take();
        self.active = Some(iterator);
        let result = scope(self, coll);
        self.active = saved.or_else(|| Some(self.default_iterator()));
        result
    }

    // ---- play-queue override protocol -----------------------------------

    /// Activate the play queue: borrow the active iterator as the queue's
    /// lookahead seed and install a consuming iterator over the queue.
    pub fn use_upcoming(
        &mut self,
        coll: &mut Collection,
        upcoming: PlaylistId,
    ) -> Result<(), EngineError> {
        if self.override_source.is_some() {
            // Already overridden; nested activation is a no-op.
            debug!("upcoming already active, ignoring");
            return Ok(());
        }
        let Some(previous) = self.take_iterator() else {
            return Ok(());
        };
        coll.set_upcoming_seed(upcoming, previous)?;
        self.install_iterator(SequenceIterator::upcoming(upcoming));
        self.override_source = Some(upcoming);
        debug!(playlist = %upcoming, "play queue override active");
        Ok(())
    }

    /// Deactivate the play queue and restore the borrowed iterator so that
    /// playback continues from where it would have been. A queue destroyed
    /// mid-override (or a lost seed) degrades to the default iterator
    /// instead of failing.
    pub fn release_upcoming(&mut self, coll: &mut Collection) {
        let Some(upcoming) = self.override_source.take() else {
            return;
        };
        match coll.take_upcoming_seed(upcoming) {
            Ok(Some(previous)) => {
                debug!(playlist = %upcoming, "play queue override released");
                self.install_iterator(previous);
            }
            Ok(None) | Err(_) => {
                warn!(playlist = %upcoming, "borrowed iterator lost, falling back to default");
                self.install_iterator(self.default_iterator());
            }
        }
    }

    pub fn override_active(&self) -> bool {
        self.override_source.is_some()
    }

    // ---- GUI/player surface ---------------------------------------------

    pub fn current_item(&self) -> Option<TrackRef> {
        self.active.as_ref().and_then(|it| it.current().cloned())
    }

    pub fn current_playlist(&self) -> PlaylistId {
        self.current_playlist
    }

    /// Advance to the next track and announce it. When the active override
    /// queue runs out, the borrowed iterator is restored and consulted in
    /// the same call, so playback flows seamlessly off the end of the queue.
    pub fn next_item(&mut self, coll: &mut Collection) -> Option<TrackRef> {
        self.ensure_valid(coll);
        let mut next = self.advance_active(coll);
        if next.is_none() && self.override_source.is_some() {
            self.release_upcoming(coll);
            next = self.advance_active(coll);
        }
        coll.note_playing(next.clone(), Instant::now());
        next
    }

    pub fn previous_item(&mut self, coll: &mut Collection) -> Option<TrackRef> {
        self.ensure_valid(coll);
        let previous = self.active_mut().backup(coll);
        coll.note_playing(previous.clone(), Instant::now());
        previous
    }

    /// Make `playlist` the current sequencing source with a fresh default
    /// iterator over it.
    pub fn set_current_playlist(
        &mut self,
        coll: &Collection,
        playlist: PlaylistId,
    ) -> Result<(), EngineError> {
        coll.playlist(playlist)?;
        self.current_playlist = playlist;
        self.install_iterator(SequenceIterator::new(
            self.default_strategy,
            playlist,
            self.default_loop,
        ));
        // Installing over an active override abandons the borrow on purpose:
        // the user picked a new playlist, the old position is obsolete.
        self.override_source = None;
        Ok(())
    }

    /// Forcibly make `track` the current item (double-click-to-play). On an
    /// active play queue this consumes the track's queue entry, if any.
    pub fn set_next_item(&mut self, coll: &mut Collection, track: TrackRef) {
        self.ensure_valid(coll);
        self.active_mut().set_current(track.clone(), coll);
        coll.note_playing(Some(track), Instant::now());
    }

    fn advance_active(&mut self, coll: &mut Collection) -> Option<TrackRef> {
        let playlist = self.active_mut().playlist();
        if let Err(err) = coll.refresh(playlist) {
            debug!(%playlist, %err, "active playlist gone before advance");
        }
        self.active_mut().advance(coll)
    }

    /// If the active iterator's playlist has been destroyed, fall back to a
    /// default iterator over the collection rather than dead-ending.
    fn ensure_valid(&mut self, coll: &Collection) {
        let playlist = self.active_mut().playlist();
        if coll.playlist(playlist).is_err() {
            warn!(%playlist, "active playlist destroyed, falling back to collection");
            self.active = Some(self.default_iterator());
            self.override_source = None;
            if coll.playlist(self.current_playlist).is_err() {
                self.current_playlist = Collection::ROOT;
            }
        }
    }
}

#[cfg(test)]
mod tests;
