use super::*;
use crate::track::{TrackData, TrackRef};

fn setup(n: usize) -> (Collection, SequenceManager, Vec<TrackRef>) {
    setup_with(n, Settings::default())
}

fn setup_with(n: usize, settings: Settings) -> (Collection, SequenceManager, Vec<TrackRef>) {
    let manager = SequenceManager::new(&settings);
    let mut coll = Collection::new(settings);
    let tracks = (0..n)
        .map(|i| coll.add_track(format!("/music/{i}.mp3"), TrackData::default()))
        .collect();
    (coll, manager, tracks)
}

#[test]
fn next_item_walks_the_collection_by_default() {
    let (mut coll, mut mgr, tracks) = setup(3);
    assert_eq!(mgr.current_item(), None);
    assert_eq!(mgr.next_item(&mut coll).as_ref(), Some(&tracks[0]));
    assert_eq!(mgr.next_item(&mut coll).as_ref(), Some(&tracks[1]));
    assert_eq!(mgr.current_item().as_ref(), Some(&tracks[1]));
}

#[test]
fn previous_item_walks_backwards() {
    let (mut coll, mut mgr, tracks) = setup(3);
    mgr.next_item(&mut coll);
    mgr.next_item(&mut coll);
    assert_eq!(mgr.previous_item(&mut coll).as_ref(), Some(&tracks[0]));
}

#[test]
fn take_and_reinstall_round_trips_the_position() {
    let (mut coll, mut mgr, tracks) = setup(3);
    mgr.next_item(&mut coll);

    let saved = mgr.take_iterator().unwrap();
    assert_eq!(mgr.current_item(), None);

    mgr.install_iterator(SequenceIterator::random(Collection::ROOT, true));
    let _ = mgr.take_iterator();

    mgr.install_iterator(saved);
    assert_eq!(mgr.current_item().as_ref(), Some(&tracks[0]));
    assert_eq!(mgr.next_item(&mut coll).as_ref(), Some(&tracks[1]));
}

#[test]
#[should_panic(expected = "take_iterator while already taken")]
fn double_take_is_a_protocol_violation() {
    let settings = Settings::default();
    let mut mgr = SequenceManager::new(&settings);
    let _first = mgr.take_iterator();
    let _second = mgr.take_iterator();
}

#[test]
fn with_override_restores_the_previous_position() {
    let (mut coll, mut mgr, tracks) = setup(3);
    mgr.next_item(&mut coll);

    let detour = SequenceIterator::random(Collection::ROOT, true);
    mgr.with_override(detour, &mut coll, |mgr, coll| {
        mgr.next_item(coll);
        mgr.next_item(coll);
    });

    assert_eq!(mgr.current_item().as_ref(), Some(&tracks[0]));
    assert_eq!(mgr.next_item(&mut coll).as_ref(), Some(&tracks[1]));
}

#[test]
fn set_next_item_announces_the_track_and_continues_from_it() {
    let (mut coll, mut mgr, tracks) = setup(3);
    mgr.set_next_item(&mut coll, tracks[1].clone());
    assert_eq!(mgr.current_item().as_ref(), Some(&tracks[1]));
    assert_eq!(mgr.next_item(&mut coll).as_ref(), Some(&tracks[2]));
}

#[test]
fn set_current_playlist_installs_a_fresh_iterator() {
    let (mut coll, mut mgr, tracks) = setup(3);
    let pl = coll.create_playlist("Favorites");
    coll.append_tracks(pl, vec![tracks[2].clone(), tracks[0].clone()])
        .unwrap();

    mgr.set_current_playlist(&coll, pl).unwrap();
    assert_eq!(mgr.current_playlist(), pl);
    assert_eq!(mgr.next_item(&mut coll).as_ref(), Some(&tracks[2]));

    let unknown = mgr.set_current_playlist(&coll, crate::playlist::PlaylistId(99));
    assert!(unknown.is_err());
}

#[test]
fn destroyed_playlist_falls_back_to_the_collection() {
    let (mut coll, mut mgr, tracks) = setup(2);
    let pl = coll.create_playlist("Favorites");
    coll.append_tracks(pl, vec![tracks[1].clone()]).unwrap();
    mgr.set_current_playlist(&coll, pl).unwrap();
    assert_eq!(mgr.next_item(&mut coll).as_ref(), Some(&tracks[1]));

    coll.remove_playlist(pl).unwrap();
    assert_eq!(mgr.next_item(&mut coll).as_ref(), Some(&tracks[0]));
    assert_eq!(mgr.current_playlist(), Collection::ROOT);
}

// ---- play-queue override ------------------------------------------------

fn queue_settings() -> Settings {
    let mut settings = Settings::default();
    settings.playback.loop_at_end = false;
    settings.upcoming.lookahead = 2;
    settings
}

#[test]
fn queue_plays_manual_entries_then_lookahead_then_hands_back() {
    let (mut coll, mut mgr, tracks) = setup_with(4, queue_settings());
    assert_eq!(mgr.next_item(&mut coll).as_ref(), Some(&tracks[0]));

    let q = coll.create_upcoming_playlist("Play Queue");
    coll.append_items(q, vec![tracks[3].clone()]).unwrap();
    mgr.use_upcoming(&mut coll, q).unwrap();
    assert!(mgr.override_active());

    // Manual entry first, then the lookahead enumerated from where the
    // borrowed iterator stood.
    assert_eq!(mgr.next_item(&mut coll).as_ref(), Some(&tracks[3]));
    assert_eq!(mgr.next_item(&mut coll).as_ref(), Some(&tracks[1]));
    assert_eq!(mgr.next_item(&mut coll).as_ref(), Some(&tracks[2]));

    // The queue ran dry: the borrowed iterator is restored at its old
    // position and consulted in the same call.
    assert_eq!(mgr.next_item(&mut coll).as_ref(), Some(&tracks[1]));
    assert!(!mgr.override_active());
}

#[test]
fn use_upcoming_twice_is_a_no_op() {
    let (mut coll, mut mgr, tracks) = setup_with(3, queue_settings());
    mgr.next_item(&mut coll);
    let q = coll.create_upcoming_playlist("Play Queue");
    coll.append_items(q, vec![tracks[2].clone()]).unwrap();

    mgr.use_upcoming(&mut coll, q).unwrap();
    mgr.use_upcoming(&mut coll, q).unwrap();
    assert!(mgr.override_active());
    assert_eq!(mgr.next_item(&mut coll).as_ref(), Some(&tracks[2]));
}

#[test]
fn release_restores_the_borrowed_iterator() {
    let (mut coll, mut mgr, tracks) = setup_with(3, queue_settings());
    assert_eq!(mgr.next_item(&mut coll).as_ref(), Some(&tracks[0]));

    let q = coll.create_upcoming_playlist("Play Queue");
    mgr.use_upcoming(&mut coll, q).unwrap();
    mgr.release_upcoming(&mut coll);

    assert!(!mgr.override_active());
    assert_eq!(mgr.current_item().as_ref(), Some(&tracks[0]));
    assert_eq!(mgr.next_item(&mut coll).as_ref(), Some(&tracks[1]));
}

#[test]
fn lost_seed_degrades_to_the_default_iterator() {
    let (mut coll, mut mgr, tracks) = setup_with(2, queue_settings());
    mgr.next_item(&mut coll);
    let q = coll.create_upcoming_playlist("Play Queue");
    mgr.use_upcoming(&mut coll, q).unwrap();

    coll.remove_playlist(q).unwrap();
    mgr.release_upcoming(&mut coll);
    assert!(!mgr.override_active());
    assert_eq!(mgr.next_item(&mut coll).as_ref(), Some(&tracks[0]));
}

#[test]
fn picking_a_playlist_abandons_an_active_override() {
    let (mut coll, mut mgr, tracks) = setup_with(3, queue_settings());
    mgr.next_item(&mut coll);
    let q = coll.create_upcoming_playlist("Play Queue");
    mgr.use_upcoming(&mut coll, q).unwrap();

    let pl = coll.create_playlist("Favorites");
    coll.append_tracks(pl, vec![tracks[2].clone()]).unwrap();
    mgr.set_current_playlist(&coll, pl).unwrap();

    assert!(!mgr.override_active());
    assert_eq!(mgr.next_item(&mut coll).as_ref(), Some(&tracks[2]));
}
