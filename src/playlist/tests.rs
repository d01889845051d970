use std::sync::mpsc;
use std::time::{Duration, Instant};

use super::*;
use crate::events::PlayEvent;
use crate::search::{Search, SearchMode};
use crate::track::{TrackData, TrackRef};

fn track(path: &str) -> TrackRef {
    TrackRef::new(path, TrackData::default())
}

fn static_playlist(allow_duplicates: bool) -> Playlist {
    Playlist::new(PlaylistId(1), "Test", Derivation::Static, allow_duplicates)
}

#[test]
fn push_rejects_duplicates_unless_allowed() {
    let t = track("/music/a.mp3");

    let mut strict = static_playlist(false);
    assert!(strict.push(t.clone()));
    assert!(!strict.push(t.clone()));
    assert_eq!(strict.len(), 1);

    let mut lax = static_playlist(true);
    assert!(lax.push(t.clone()));
    assert!(lax.push(t));
    assert_eq!(lax.len(), 2);
}

#[test]
fn remove_at_notifies_before_removing() {
    let mut pl = static_playlist(false);
    let a = track("/music/a.mp3");
    let b = track("/music/b.mp3");
    pl.push(a.clone());
    pl.push(b.clone());

    let rx = pl.subscribe();
    assert_eq!(pl.remove_at(0), Some(a.clone()));
    assert_eq!(rx.try_recv().ok(), Some(ChangeEvent::Removing(a)));
    assert_eq!(pl.tracks(), &[b]);

    assert_eq!(pl.remove_at(5), None);
}

#[test]
fn remove_track_removes_every_occurrence() {
    let mut pl = static_playlist(true);
    let a = track("/music/a.mp3");
    let b = track("/music/b.mp3");
    pl.push(a.clone());
    pl.push(b.clone());
    pl.push(a.clone());

    let rx = pl.subscribe();
    assert_eq!(pl.remove_track(&a), 2);
    assert_eq!(rx.try_recv().ok(), Some(ChangeEvent::Removing(a.clone())));
    assert_eq!(rx.try_recv().ok(), Some(ChangeEvent::Removing(a)));
    assert_eq!(pl.tracks(), &[b]);
}

#[test]
fn clear_tracks_notifies_per_entry() {
    let mut pl = static_playlist(false);
    pl.push(track("/music/a.mp3"));
    pl.push(track("/music/b.mp3"));

    let rx = pl.subscribe();
    pl.clear_tracks();
    assert!(pl.is_empty());
    let removals = rx
        .try_iter()
        .filter(|e| matches!(e, ChangeEvent::Removing(_)))
        .count();
    assert_eq!(removals, 2);
}

// ---- history debounce ---------------------------------------------------

fn history(window_ms: u64) -> (mpsc::Sender<PlayEvent>, HistoryList) {
    let (tx, rx) = mpsc::channel();
    (tx, HistoryList::new(rx, Duration::from_millis(window_ms), 100))
}

#[test]
fn pending_entry_commits_only_after_the_window() {
    let (_tx, mut list) = history(800);
    let t0 = Instant::now();
    let a = track("/music/a.mp3");

    list.note(a.clone(), t0);
    assert!(list.take_due(t0 + Duration::from_millis(799)).is_empty());
    assert_eq!(list.take_due(t0 + Duration::from_millis(800)), vec![a]);
    // Taken; nothing left.
    assert!(list.take_due(t0 + Duration::from_secs(10)).is_empty());
}

#[test]
fn newer_play_replaces_the_pending_entry() {
    let (_tx, mut list) = history(800);
    let t0 = Instant::now();
    let a = track("/music/a.mp3");
    let b = track("/music/b.mp3");

    // Skip from a to b within the window: a never commits.
    list.note(a, t0);
    list.note(b.clone(), t0 + Duration::from_millis(100));
    assert!(list.take_due(t0 + Duration::from_millis(850)).is_empty());
    assert_eq!(list.take_due(t0 + Duration::from_millis(900)), vec![b]);
}

#[test]
fn spaced_plays_each_commit() {
    let (_tx, mut list) = history(100);
    let t0 = Instant::now();
    let a = track("/music/a.mp3");
    let b = track("/music/b.mp3");

    list.note(a.clone(), t0);
    assert_eq!(list.take_due(t0 + Duration::from_millis(100)), vec![a]);
    list.note(b.clone(), t0 + Duration::from_millis(500));
    assert_eq!(list.take_due(t0 + Duration::from_millis(600)), vec![b]);
}

#[test]
fn spaced_plays_commit_even_without_an_intermediate_read() {
    let (_tx, mut list) = history(100);
    let t0 = Instant::now();
    let a = track("/music/a.mp3");
    let b = track("/music/b.mp3");

    // a's window ran out long before b arrived; a must not be lost just
    // because nobody read history in between.
    list.note(a.clone(), t0);
    list.note(b.clone(), t0 + Duration::from_millis(500));
    assert_eq!(list.take_due(t0 + Duration::from_millis(700)), vec![a, b]);
}

#[test]
fn drain_events_pulls_the_latest_play_into_pending() {
    let (tx, mut list) = history(100);
    let t0 = Instant::now();
    let a = track("/music/a.mp3");
    let b = track("/music/b.mp3");

    tx.send(PlayEvent { track: a, at: t0 }).ok();
    tx.send(PlayEvent {
        track: b.clone(),
        at: t0 + Duration::from_millis(10),
    })
    .ok();
    list.drain_events();
    assert_eq!(list.take_due(t0 + Duration::from_millis(110)), vec![b]);
}

// ---- search list feeds --------------------------------------------------

fn search_list(sources: Vec<PlaylistId>) -> SearchList {
    let mut list = SearchList::new(Search::new(Vec::new(), SearchMode::MatchAny, sources));
    list.clear_dirty();
    list
}

#[test]
fn source_change_marks_dirty() {
    let mut subs: Subscribers<ChangeEvent> = Subscribers::new();
    let mut list = search_list(vec![PlaylistId(1)]);
    list.attach_feed(PlaylistId(1), subs.subscribe());

    list.drain_feeds();
    assert!(!list.is_dirty());

    subs.notify(ChangeEvent::Changed);
    list.drain_feeds();
    assert!(list.is_dirty());
}

#[test]
fn playing_changes_do_not_mark_dirty() {
    let mut subs: Subscribers<ChangeEvent> = Subscribers::new();
    let mut list = search_list(vec![PlaylistId(1)]);
    list.attach_feed(PlaylistId(1), subs.subscribe());

    subs.notify(ChangeEvent::PlayingChanged(None));
    list.drain_feeds();
    assert!(!list.is_dirty());
}

#[test]
fn destroyed_source_is_dropped_from_the_search() {
    let mut live: Subscribers<ChangeEvent> = Subscribers::new();
    let mut list = search_list(vec![PlaylistId(1), PlaylistId(2)]);
    {
        let mut dead: Subscribers<ChangeEvent> = Subscribers::new();
        list.attach_feed(PlaylistId(1), dead.subscribe());
        list.attach_feed(PlaylistId(2), live.subscribe());
        // `dead` drops here, disconnecting playlist 1's feed.
    }

    list.drain_feeds();
    assert!(list.is_dirty());
    assert_eq!(list.search().sources(), &[PlaylistId(2)]);
}
