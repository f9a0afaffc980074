use std::fmt;

use serde::{Deserialize, Serialize};

/// Video resolution from the fixed set the engine recognizes.
///
/// Captions render it with an upper-case suffix (`"720P"`), bulk entries and
/// summaries with a lower-case one (`"720p"`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Quality {
    P144,
    P240,
    P360,
    /// 480p, standard definition
    SD480,
    /// 720p, high definition
    #[default]
    HD720,
    /// 1080p, full HD
    FHD1080,
    /// 1440p, quad HD
    QHD1440,
    /// 2160p, ultra HD / 4K
    UHD2160,
}

impl Quality {
    /// Every recognized quality, ascending.
    pub const ALL: [Quality; 8] = [
        Self::P144,
        Self::P240,
        Self::P360,
        Self::SD480,
        Self::HD720,
        Self::FHD1080,
        Self::QHD1440,
        Self::UHD2160,
    ];

    /// Maps a line count to its enumerated value; anything else is unrecognized.
    #[must_use]
    pub fn from_lines(lines: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.lines() == lines)
    }

    /// Parses a digit run. Runs too long for `u32` are simply unrecognized.
    #[must_use]
    pub fn from_digits(digits: &str) -> Option<Self> {
        digits.parse().ok().and_then(Self::from_lines)
    }

    /// Vertical line count, e.g. `1080`.
    #[must_use]
    pub fn lines(self) -> u32 {
        match self {
            Self::P144 => 144,
            Self::P240 => 240,
            Self::P360 => 360,
            Self::SD480 => 480,
            Self::HD720 => 720,
            Self::FHD1080 => 1080,
            Self::QHD1440 => 1440,
            Self::UHD2160 => 2160,
        }
    }

    /// Caption spelling with an upper-case suffix, e.g. `"1080P"`.
    #[must_use]
    pub fn caption_label(self) -> String {
        format!("{}P", self.lines())
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}p", self.lines())
    }
}

/// Canonical audio/language code appended to formatted names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageCode {
    Tam,
    Eng,
    Multi,
    Dual,
}

impl LanguageCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tam => "Tam",
            Self::Eng => "Eng",
            Self::Multi => "Multi",
            Self::Dual => "Dual",
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Release packaging of a bulk entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FileType {
    #[default]
    Single,
    Batch,
    Dual,
    Multi,
}

impl FileType {
    /// Matches a bracket label case-insensitively (`"batch"`, `"DUAL"`, ...).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "single" => Some(Self::Single),
            "batch" => Some(Self::Batch),
            "dual" => Some(Self::Dual),
            "multi" => Some(Self::Multi),
            _ => None,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "Single"),
            Self::Batch => write!(f, "Batch"),
            Self::Dual => write!(f, "Dual"),
            Self::Multi => write!(f, "Multi"),
        }
    }
}
