//! Engine error type.
//!
//! Most of the engine's failure modes are structural (guarded invariants,
//! skipped dangling references) rather than recoverable errors; the few that
//! are surfaced to callers live here.

use std::path::PathBuf;

use thiserror::Error;

use crate::playlist::PlaylistId;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The playlist id is not (or no longer) registered with the collection.
    #[error("unknown playlist id {0}")]
    UnknownPlaylist(PlaylistId),

    /// The path does not resolve to a track known to the collection.
    #[error("unknown track path {}", .0.display())]
    UnknownTrack(PathBuf),

    /// Setting these sources would make the playlist (transitively) its own
    /// source. Rejected at configuration time; never a runtime condition.
    #[error("playlist {0} would become its own source")]
    CyclicSources(PlaylistId),

    /// The operation only applies to playlists of a particular derivation.
    #[error("operation requires a {expected} playlist")]
    WrongKind { expected: &'static str },
}
