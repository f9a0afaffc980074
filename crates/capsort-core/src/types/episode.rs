use std::fmt;

use serde::{Deserialize, Serialize};

/// Season/episode fallback used whenever a number cannot be recovered.
pub const DEFAULT_NUMBER: &str = "01";

/// Season, episode and raw title recovered from a caption or filename.
///
/// `season` and `episode` are digit strings zero-padded to at least two
/// characters; they are never empty. `title` is the raw, uncleaned text the
/// matching pattern family attributed to the show name and may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EpisodeInfo {
    /// Season number, e.g. `"01"` or `"123"`.
    pub season: String,
    /// Episode number, e.g. `"07"`.
    pub episode: String,
    /// Raw title text.
    pub title: String,
}

impl EpisodeInfo {
    /// Builds an `EpisodeInfo` from raw digit runs, padding both to width 2.
    #[must_use]
    pub fn new(season: &str, episode: &str, title: impl Into<String>) -> Self {
        Self {
            season: pad_number(season),
            episode: pad_number(episode),
            title: title.into(),
        }
    }

    /// The no-match result: default numbers and the whole input as title.
    #[must_use]
    pub fn fallback(title: impl Into<String>) -> Self {
        Self::new(DEFAULT_NUMBER, DEFAULT_NUMBER, title)
    }

    /// Canonical `[S<SS>-E<EE>]` tag used in formatted captions.
    #[must_use]
    pub fn tag(&self) -> String {
        format!("[S{}-E{}]", self.season, self.episode)
    }
}

impl fmt::Display for EpisodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tag(), self.title)
    }
}

/// Left-pads a digit run with zeros to width 2. Never truncates.
#[must_use]
pub fn pad_number(digits: &str) -> String {
    format!("{digits:0>2}")
}
