use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::track::{Column, TrackRef};

/// How a component's query is compared against an attribute value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// Substring match.
    Contains,
    /// The query must appear as a complete word (bounded by non-alphanumeric
    /// characters or the ends of the value).
    Exact,
    /// The query is a regular expression.
    Pattern,
}

/// One search criterion: a query matched against a set of target columns.
///
/// An empty column set means "all searchable columns". Pure value type;
/// equality compares the criteria, not the compiled pattern cache.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchComponent {
    query: String,
    case_sensitive: bool,
    mode: MatchMode,
    columns: Vec<Column>,
    #[serde(skip)]
    compiled: OnceLock<Option<Regex>>,
}

impl SearchComponent {
    pub fn new(
        query: impl Into<String>,
        case_sensitive: bool,
        mode: MatchMode,
        columns: Vec<Column>,
    ) -> Self {
        Self {
            query: query.into(),
            case_sensitive,
            mode,
            columns,
            compiled: OnceLock::new(),
        }
    }

    /// Convenience for the common case: case-insensitive substring search
    /// over all columns.
    pub fn contains(query: impl Into<String>) -> Self {
        Self::new(query, false, MatchMode::Contains, Vec::new())
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// True when this component matches `track`. The `Track` column applies
    /// a numeric zero-pad fixup to `pad_width` digits on both sides of the
    /// comparison before matching.
    pub fn matches(&self, track: &TrackRef, pad_width: usize) -> bool {
        let columns = if self.columns.is_empty() {
            Column::searchable()
        } else {
            &self.columns
        };

        columns.iter().any(|&col| {
            let mut value = track.attribute(col);
            if col == Column::Track {
                value = pad_number(&value, pad_width);
            }

            if self.mode == MatchMode::Pattern {
                // Case sensitivity is honored via an inline (?i) flag; an
                // invalid pattern matches nothing.
                return self.pattern().is_some_and(|re| re.is_match(&value));
            }

            let query = if col == Column::Track {
                pad_number(&self.query, pad_width)
            } else {
                self.query.clone()
            };
            let (value, query) = if self.case_sensitive {
                (value, query)
            } else {
                (value.to_lowercase(), query.to_lowercase())
            };

            match self.mode {
                MatchMode::Contains => value.contains(&query),
                MatchMode::Exact => contains_word(&value, &query),
                MatchMode::Pattern => false,
            }
        })
    }

    fn pattern(&self) -> Option<&Regex> {
        self.compiled
            .get_or_init(|| {
                let raw = if self.case_sensitive {
                    self.query.clone()
                } else {
                    format!("(?i){}", self.query)
                };
                match Regex::new(&raw) {
                    Ok(re) => Some(re),
                    Err(err) => {
                        warn!(query = %self.query, %err, "invalid search pattern, matching nothing");
                        None
                    }
                }
            })
            .as_ref()
    }
}

impl Clone for SearchComponent {
    fn clone(&self) -> Self {
        // The pattern cache is cheap to rebuild; don't carry it over.
        Self::new(
            self.query.clone(),
            self.case_sensitive,
            self.mode,
            self.columns.clone(),
        )
    }
}

impl PartialEq for SearchComponent {
    fn eq(&self, other: &Self) -> bool {
        self.query == other.query
            && self.case_sensitive == other.case_sensitive
            && self.mode == other.mode
            && self.columns == other.columns
    }
}

impl Eq for SearchComponent {}

/// Zero-pad a purely numeric string to at least `width` digits. Anything
/// non-numeric passes through trimmed but otherwise untouched.
pub(crate) fn pad_number(s: &str, width: usize) -> String {
    let trimmed = s.trim();
    if !trimmed.is_empty()
        && trimmed.len() < width
        && trimmed.chars().all(|c| c.is_ascii_digit())
    {
        format!("{trimmed:0>width$}")
    } else {
        trimmed.to_string()
    }
}

/// Word-bounded substring search: `query` must occur in `value` with
/// non-alphanumeric characters (or the string ends) on both sides.
pub(crate) fn contains_word(value: &str, query: &str) -> bool {
    if query.is_empty() {
        return false;
    }

    let mut from = 0;
    while let Some(found) = value[from..].find(query) {
        let begin = from + found;
        let end = begin + query.len();
        let bounded_left = value[..begin]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let bounded_right = value[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        if bounded_left && bounded_right {
            return true;
        }
        // Step one char and keep scanning.
        match value[begin..].chars().next() {
            Some(c) => from = begin + c.len_utf8(),
            None => break,
        }
    }
    false
}
