//! Sequence iterators: the strategies that decide what plays next.
//!
//! A [`SequenceIterator`] is a cursor over one playlist. It is either idle
//! (`current` is `None`) or ready; `advance`/`backup` move it under the
//! strategy's rule and return the new current track, or `None` when the
//! sequence is exhausted. Cloning yields an independent cursor with the same
//! strategy and position, which is how positions survive override/restore.

use std::collections::VecDeque;

use rand::RngExt;

use crate::collection::Collection;
use crate::playlist::PlaylistId;
use crate::track::{Column, TrackRef};

/// The selectable sequencing strategies.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StrategyKind {
    Linear,
    Random,
    AlbumRandom,
}

#[derive(Debug, Clone)]
enum Strategy {
    /// Playlist order.
    Linear,
    /// Uniform pick among the tracks not yet played this pass; the pass
    /// reseeds when it empties.
    Random { remaining: Vec<TrackRef> },
    /// A random album, played through in playlist order, then another.
    AlbumRandom {
        queue: VecDeque<TrackRef>,
        remaining_albums: Vec<String>,
    },
    /// Consume the play-queue playlist front-first. `backup` is a no-op.
    UpcomingQueue,
}

#[derive(Debug, Clone)]
pub struct SequenceIterator {
    playlist: PlaylistId,
    current: Option<TrackRef>,
    loop_at_end: bool,
    strategy: Strategy,
}

impl SequenceIterator {
    pub fn linear(playlist: PlaylistId, loop_at_end: bool) -> Self {
        Self::with_strategy(playlist, loop_at_end, Strategy::Linear)
    }

    pub fn random(playlist: PlaylistId, loop_at_end: bool) -> Self {
        Self::with_strategy(playlist, loop_at_end, Strategy::Random { remaining: Vec::new() })
    }

    pub fn album_random(playlist: PlaylistId, loop_at_end: bool) -> Self {
        Self::with_strategy(
            playlist,
            loop_at_end,
            Strategy::AlbumRandom {
                queue: VecDeque::new(),
                remaining_albums: Vec::new(),
            },
        )
    }

    /// Iterator over the play-queue playlist. Always consuming, never loops.
    pub fn upcoming(playlist: PlaylistId) -> Self {
        Self::with_strategy(playlist, false, Strategy::UpcomingQueue)
    }

    pub fn new(kind: StrategyKind, playlist: PlaylistId, loop_at_end: bool) -> Self {
        match kind {
            StrategyKind::Linear => Self::linear(playlist, loop_at_end),
            StrategyKind::Random => Self::random(playlist, loop_at_end),
            StrategyKind::AlbumRandom => Self::album_random(playlist, loop_at_end),
        }
    }

    fn with_strategy(playlist: PlaylistId, loop_at_end: bool, strategy: Strategy) -> Self {
        Self {
            playlist,
            current: None,
            loop_at_end,
            strategy,
        }
    }

    pub fn playlist(&self) -> PlaylistId {
        self.playlist
    }

    pub fn current(&self) -> Option<&TrackRef> {
        self.current.as_ref()
    }

    pub fn loop_at_end(&self) -> bool {
        self.loop_at_end
    }

    pub(crate) fn is_upcoming(&self) -> bool {
        matches!(self.strategy, Strategy::UpcomingQueue)
    }

    /// Move to the next track under the strategy's rule. Returns `None` and
    /// goes idle when the sequence is exhausted and looping is off. A
    /// current track that has since left the playlist is skipped, never
    /// returned again.
    pub fn advance(&mut self, coll: &mut Collection) -> Option<TrackRef> {
        let next = match &mut self.strategy {
            Strategy::Linear => {
                step_linear(coll, self.playlist, self.current.as_ref(), self.loop_at_end, 1)
            }
            Strategy::Random { remaining } => advance_random(
                coll,
                self.playlist,
                self.current.as_ref(),
                self.loop_at_end,
                remaining,
            ),
            Strategy::AlbumRandom {
                queue,
                remaining_albums,
            } => advance_album_random(
                coll,
                self.playlist,
                self.current.as_ref(),
                self.loop_at_end,
                queue,
                remaining_albums,
            ),
            Strategy::UpcomingQueue => coll.pop_upcoming(self.playlist),
        };
        self.current = next.clone();
        next
    }

    /// Move to the previous track. The upcoming variant is a consumable
    /// queue, not a bidirectional cursor, so `backup` leaves it untouched
    /// and returns the current track. Random strategies back up in playlist
    /// order.
    pub fn backup(&mut self, coll: &Collection) -> Option<TrackRef> {
        if self.is_upcoming() {
            return self.current.clone();
        }
        let prev = step_linear(coll, self.playlist, self.current.as_ref(), self.loop_at_end, -1);
        self.current = prev.clone();
        prev
    }

    /// Forcibly relocate the cursor, e.g. when the user double-clicks a
    /// track. On the upcoming variant a queued entry is consumed as it
    /// starts playing; a track from outside the queue plays without
    /// touching it.
    pub fn set_current(&mut self, track: TrackRef, coll: &mut Collection) {
        match &mut self.strategy {
            Strategy::Linear => {}
            Strategy::Random { remaining } => {
                remaining.retain(|t| t != &track);
            }
            Strategy::AlbumRandom {
                queue,
                remaining_albums,
            } => {
                // Continue the clicked track's album from its position.
                let album = track.attribute(Column::Album);
                queue.clear();
                if let Ok(pl) = coll.playlist(self.playlist) {
                    if let Some(pos) = pl.position(&track) {
                        queue.extend(
                            pl.tracks()[pos + 1..]
                                .iter()
                                .filter(|t| t.attribute(Column::Album) == album)
                                .cloned(),
                        );
                    }
                }
                remaining_albums.retain(|a| a != &album);
            }
            Strategy::UpcomingQueue => {
                coll.consume_queued(self.playlist, &track);
            }
        }
        self.current = Some(track);
    }

    /// Clear to idle without touching the underlying playlist.
    pub fn reset(&mut self) {
        self.current = None;
        match &mut self.strategy {
            Strategy::Linear | Strategy::UpcomingQueue => {}
            Strategy::Random { remaining } => remaining.clear(),
            Strategy::AlbumRandom {
                queue,
                remaining_albums,
            } => {
                queue.clear();
                remaining_albums.clear();
            }
        }
    }
}

/// One linear step in playlist order. `dir` is +1 or -1. An idle cursor (or
/// one whose track left the playlist) restarts at the first/last track.
fn step_linear(
    coll: &Collection,
    playlist: PlaylistId,
    current: Option<&TrackRef>,
    loop_at_end: bool,
    dir: i64,
) -> Option<TrackRef> {
    let pl = coll.playlist(playlist).ok()?;
    let tracks = pl.tracks();
    if tracks.is_empty() {
        return None;
    }

    let restart = if dir > 0 {
        tracks.first()
    } else {
        tracks.last()
    };
    match current.and_then(|c| pl.position(c)) {
        None => restart.cloned(),
        Some(pos) => {
            let next = pos as i64 + dir;
            if next >= 0 && (next as usize) < tracks.len() {
                Some(tracks[next as usize].clone())
            } else if loop_at_end {
                restart.cloned()
            } else {
                None
            }
        }
    }
}

fn advance_random(
    coll: &Collection,
    playlist: PlaylistId,
    current: Option<&TrackRef>,
    loop_at_end: bool,
    remaining: &mut Vec<TrackRef>,
) -> Option<TrackRef> {
    let pl = coll.playlist(playlist).ok()?;
    if pl.is_empty() {
        return None;
    }

    // Evict anything that left the playlist since the pass began.
    remaining.retain(|t| pl.contains(t));

    if remaining.is_empty() {
        if current.is_some() && !loop_at_end {
            // Pass exhausted; go idle. The next advance starts a new pass.
            return None;
        }
        // Reseed, excluding the current track so it isn't replayed
        // back-to-back (unless it is the only track).
        remaining.extend(
            pl.tracks()
                .iter()
                .filter(|t| current != Some(*t))
                .cloned(),
        );
        if remaining.is_empty() {
            remaining.extend(pl.tracks().iter().cloned());
        }
    }

    let index = rand::rng().random_range(0..remaining.len());
    Some(remaining.swap_remove(index))
}

fn advance_album_random(
    coll: &Collection,
    playlist: PlaylistId,
    current: Option<&TrackRef>,
    loop_at_end: bool,
    queue: &mut VecDeque<TrackRef>,
    remaining_albums: &mut Vec<String>,
) -> Option<TrackRef> {
    let pl = coll.playlist(playlist).ok()?;
    if pl.is_empty() {
        return None;
    }

    // Finish the selected album before anything else.
    queue.retain(|t| pl.contains(t));
    if let Some(track) = queue.pop_front() {
        return Some(track);
    }

    let albums = distinct_albums(pl.tracks());
    remaining_albums.retain(|a| albums.contains(a));
    if remaining_albums.is_empty() {
        if current.is_some() && !loop_at_end {
            return None;
        }
        remaining_albums.extend(albums.iter().cloned());
    }

    // Avoid replaying the album that just finished when others remain.
    let current_album = current.map(|t| t.attribute(Column::Album));
    let candidates: Vec<usize> = (0..remaining_albums.len())
        .filter(|&i| {
            remaining_albums.len() == 1 || Some(&remaining_albums[i]) != current_album.as_ref()
        })
        .collect();
    let pick = candidates[rand::rng().random_range(0..candidates.len())];
    let album = remaining_albums.remove(pick);

    queue.extend(
        pl.tracks()
            .iter()
            .filter(|t| t.attribute(Column::Album) == album)
            .cloned(),
    );
    queue.pop_front()
}

fn distinct_albums(tracks: &[TrackRef]) -> Vec<String> {
    let mut albums: Vec<String> = Vec::new();
    for track in tracks {
        let album = track.attribute(Column::Album);
        if !albums.contains(&album) {
            albums.push(album);
        }
    }
    albums
}
