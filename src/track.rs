//! Track references and attribute access.
//!
//! A [`TrackRef`] is a shared handle to a track's cached metadata snapshot,
//! keyed by absolute file path. The collection owns the snapshot and is its
//! only writer; every playlist holds clones of the same handle, so a tag edit
//! made through the collection is visible everywhere at once.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Cached metadata snapshot for a single track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackData {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
    pub track_number: u32,
    pub year: u32,
    pub comment: String,
    /// Duration in whole seconds.
    pub length_secs: u64,
    pub bitrate: u32,
}

/// A sortable/searchable track attribute.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Column {
    Title,
    Artist,
    Album,
    Genre,
    Track,
    Year,
    Comment,
    Length,
    Bitrate,
}

impl Column {
    /// The columns a search with an empty target set runs against.
    /// Bitrate is sortable but not searched by default.
    pub fn searchable() -> &'static [Column] {
        &[
            Column::Title,
            Column::Artist,
            Column::Album,
            Column::Genre,
            Column::Track,
            Column::Year,
            Column::Comment,
            Column::Length,
        ]
    }
}

struct TrackShared {
    path: PathBuf,
    data: Mutex<TrackData>,
}

/// Shared, path-keyed handle to a track's metadata snapshot.
///
/// Equality and hashing use the path alone; two handles for the same path
/// compare equal regardless of which playlist they came from.
#[derive(Clone)]
pub struct TrackRef(Arc<TrackShared>);

impl TrackRef {
    pub fn new(path: impl Into<PathBuf>, data: TrackData) -> Self {
        Self(Arc::new(TrackShared {
            path: path.into(),
            data: Mutex::new(data),
        }))
    }

    pub fn path(&self) -> &Path {
        &self.0.path
    }

    /// Copy of the current snapshot.
    pub fn data(&self) -> TrackData {
        self.0.data.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Replace the snapshot. Only the collection calls this; everyone else
    /// observes the change through the collection's notifications.
    pub(crate) fn set_data(&self, data: TrackData) {
        *self.0.data.lock().unwrap_or_else(|e| e.into_inner()) = data;
    }

    /// The string form of an attribute, as used for searching and sorting.
    /// Numeric attributes render as plain decimal; length as whole seconds.
    pub fn attribute(&self, column: Column) -> String {
        let data = self.0.data.lock().unwrap_or_else(|e| e.into_inner());
        match column {
            Column::Title => data.title.clone(),
            Column::Artist => data.artist.clone(),
            Column::Album => data.album.clone(),
            Column::Genre => data.genre.clone(),
            Column::Track => data.track_number.to_string(),
            Column::Year => data.year.to_string(),
            Column::Comment => data.comment.clone(),
            Column::Length => data.length_secs.to_string(),
            Column::Bitrate => data.bitrate.to_string(),
        }
    }
}

impl PartialEq for TrackRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.path == other.0.path
    }
}

impl Eq for TrackRef {}

impl Hash for TrackRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.path.hash(state);
    }
}

impl fmt::Debug for TrackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackRef")
            .field("path", &self.0.path)
            .finish()
    }
}
