use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::types::Quality;

/// Quality pattern families, in evaluation order.
///
/// Later families are looser than earlier ones. Only the first occurrence of
/// each family is considered, and a digit run outside the recognized set does
/// not stop the search: evaluation moves on to the next family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityPattern {
    /// `1080p`, `720P`
    Suffixed,
    /// `[1080]`, `[1080p]`
    Bracketed,
    /// `Qᴜᴀʟɪᴛʏ: 1080`, the small-caps label spelling
    LabeledGlyph,
    /// `QUALITY: 1080`
    Labeled,
    /// `1080 p`
    Spaced,
}

impl QualityPattern {
    pub const ORDER: [QualityPattern; 5] = [
        Self::Suffixed,
        Self::Bracketed,
        Self::LabeledGlyph,
        Self::Labeled,
        Self::Spaced,
    ];

    fn source(self) -> &'static str {
        match self {
            Self::Suffixed => r"(?i)(\d+)p",
            Self::Bracketed => r"(?i)\[(\d+)p?\]",
            Self::LabeledGlyph => r"(?i)Qᴜᴀʟɪᴛʏ\s*:\s*(\d+)p?",
            Self::Labeled => r"(?i)QUALITY\s*:\s*(\d+)p?",
            Self::Spaced => r"(?i)(\d+)\s*p",
        }
    }
}

/// Maps loosely written resolution tokens to a [`Quality`].
pub struct QualityNormalizer {
    patterns: Vec<(QualityPattern, Regex)>,
}

impl QualityNormalizer {
    /// Compiles the pattern families.
    ///
    /// # Errors
    ///
    /// Returns `CapsortError::RegexError` if a pattern fails to compile.
    pub fn new() -> Result<Self> {
        let patterns = QualityPattern::ORDER
            .into_iter()
            .map(|family| Ok((family, Regex::new(family.source())?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Returns the first recognized quality, or `None` when no family yields one.
    #[must_use]
    pub fn extract(&self, text: &str) -> Option<Quality> {
        self.patterns.iter().find_map(|(family, re)| {
            let digits = re.captures(text)?.get(1)?.as_str();
            let quality = Quality::from_digits(digits);
            if quality.is_none() {
                debug!(?family, digits, "unrecognized quality digits, trying next family");
            }
            quality
        })
    }

    /// Caption spelling of the detected quality, `"720P"` when none is found.
    #[must_use]
    pub fn normalize(&self, text: &str) -> String {
        self.extract(text).unwrap_or_default().caption_label()
    }
}
