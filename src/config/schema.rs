use serde::Deserialize;

use crate::sequence::StrategyKind;

/// Top-level engine settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/attacca/config.toml` or
/// `~/.config/attacca/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `ATTACCA__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search: SearchSettings,
    pub history: HistorySettings,
    pub upcoming: UpcomingSettings,
    pub playback: PlaybackSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Minimum width track numbers are zero-padded to before comparison,
    /// so that the query "1" finds track "01".
    pub track_number_width: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            track_number_width: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Debounce window for history entries (milliseconds). Track changes
    /// arriving within this window coalesce into a single entry.
    pub debounce_ms: u64,
    /// Maximum number of history entries kept; oldest are evicted first.
    pub capacity: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            debounce_ms: 800,
            capacity: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpcomingSettings {
    /// How many naturally-next tracks the play queue shows beyond whatever
    /// the user queued explicitly.
    pub lookahead: usize,
}

impl Default for UpcomingSettings {
    fn default() -> Self {
        Self { lookahead: 10 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether sequencing wraps around at the end of a playlist.
    pub loop_at_end: bool,
    /// Default sequencing strategy for newly installed iterators.
    pub strategy: StrategySetting,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            loop_at_end: true,
            strategy: StrategySetting::Linear,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategySetting {
    Linear,
    #[serde(alias = "shuffle")]
    Random,
    #[serde(alias = "album_random", alias = "album-shuffle")]
    AlbumRandom,
}

impl Default for StrategySetting {
    fn default() -> Self {
        Self::Linear
    }
}

impl From<StrategySetting> for StrategyKind {
    fn from(setting: StrategySetting) -> Self {
        match setting {
            StrategySetting::Linear => StrategyKind::Linear,
            StrategySetting::Random => StrategyKind::Random,
            StrategySetting::AlbumRandom => StrategyKind::AlbumRandom,
        }
    }
}
