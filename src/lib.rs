//! attacca — the playback-sequencing and dynamic-playlist engine behind a
//! music library manager.
//!
//! The engine decides which track plays next and keeps derived playlists
//! (search results, play history, the play queue) lazily consistent with
//! their sources. The GUI, audio output, tag I/O and on-disk persistence are
//! external collaborators; they talk to the engine through [`Collection`]
//! (tracks, playlists, change notifications) and [`SequenceManager`]
//! (next/previous/current, play-queue override).
//!
//! ```no_run
//! use attacca::{Collection, SequenceManager, Settings, TrackData};
//!
//! let settings = Settings::load().unwrap_or_default();
//! let mut collection = Collection::new(settings.clone());
//! let mut manager = SequenceManager::new(&settings);
//!
//! collection.add_track("/music/a.flac", TrackData::default());
//! let next = manager.next_item(&mut collection);
//! println!("{next:?}");
//! ```

pub mod collection;
pub mod config;
pub mod error;
pub mod events;
pub mod manager;
pub mod playlist;
pub mod search;
pub mod sequence;
pub mod track;

pub use collection::Collection;
pub use config::Settings;
pub use error::EngineError;
pub use events::{ChangeEvent, PlayEvent};
pub use manager::SequenceManager;
pub use playlist::{Derivation, Playlist, PlaylistId};
pub use search::{MatchMode, Search, SearchComponent, SearchMode, SearchSpec};
pub use sequence::{SequenceIterator, StrategyKind};
pub use track::{Column, TrackData, TrackRef};
