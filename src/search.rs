//! Multi-criterion track searches.
//!
//! A [`SearchComponent`] is a pure predicate over one track's attributes; a
//! [`Search`] folds several components with any/all semantics over the union
//! of its source playlists. Searches have no index: evaluation cost is
//! proportional to corpus size, which is why dynamic playlists only re-run
//! them behind a dirty flag.

mod component;

pub use component::{MatchMode, SearchComponent};

use serde::{Deserialize, Serialize};

use crate::playlist::PlaylistId;
use crate::track::TrackRef;

/// How component results are folded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
    /// Logical OR. With no components this matches nothing.
    MatchAny,
    /// Logical AND. With no components this matches everything; the default
    /// "show all" search is an empty MatchAll.
    MatchAll,
}

/// A declarative filter: components, fold mode and source playlists.
#[derive(Debug, Clone, PartialEq)]
pub struct Search {
    components: Vec<SearchComponent>,
    mode: SearchMode,
    sources: Vec<PlaylistId>,
}

impl Search {
    pub fn new(
        components: Vec<SearchComponent>,
        mode: SearchMode,
        sources: Vec<PlaylistId>,
    ) -> Self {
        Self {
            components,
            mode,
            sources,
        }
    }

    /// The "show all" search: empty MatchAll over the given sources.
    pub fn match_all(sources: Vec<PlaylistId>) -> Self {
        Self::new(Vec::new(), SearchMode::MatchAll, sources)
    }

    pub fn components(&self) -> &[SearchComponent] {
        &self.components
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn sources(&self) -> &[PlaylistId] {
        &self.sources
    }

    pub(crate) fn sources_mut(&mut self) -> &mut Vec<PlaylistId> {
        &mut self.sources
    }

    /// Evaluate every component against `track` and fold per [`SearchMode`],
    /// short-circuiting on the first determining result.
    ///
    /// Boundary behavior is fixed by the fold identities: `MatchAny` over an
    /// empty component list matches nothing, `MatchAll` matches everything.
    pub fn evaluate(&self, track: &TrackRef, pad_width: usize) -> bool {
        match self.mode {
            SearchMode::MatchAny => self
                .components
                .iter()
                .any(|c| c.matches(track, pad_width)),
            SearchMode::MatchAll => self
                .components
                .iter()
                .all(|c| c.matches(track, pad_width)),
        }
    }
}

/// Matched/unmatched partition of a search corpus.
#[derive(Debug, Default)]
pub struct SearchResults {
    pub matched: Vec<TrackRef>,
    pub unmatched: Vec<TrackRef>,
}

/// Persistence-facing form of a search: components, mode and source playlist
/// *names* (ids are session-local). The on-disk format itself belongs to the
/// persistence collaborator; this is just the serializable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSpec {
    pub components: Vec<SearchComponent>,
    pub mode: SearchMode,
    pub sources: Vec<String>,
}
