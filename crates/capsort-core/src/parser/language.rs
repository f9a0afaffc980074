use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::types::LanguageCode;

/// Substring table checked against lower-cased text.
///
/// Order is a tie-break: the first key contained in the text wins, so
/// `"tamil"` is checked before `"tam"` and `"multi audio"` before `"multi"`.
/// Reordering entries changes results for mixed-language captions.
pub const LANGUAGE_TABLE: [(&str, LanguageCode); 9] = [
    ("தமிழ்", LanguageCode::Tam),
    ("tamil", LanguageCode::Tam),
    ("tam", LanguageCode::Tam),
    ("english", LanguageCode::Eng),
    ("eng", LanguageCode::Eng),
    ("multi audio", LanguageCode::Multi),
    ("multi", LanguageCode::Multi),
    ("dual audio", LanguageCode::Dual),
    ("dual", LanguageCode::Dual),
];

/// Maps loosely written audio/language tokens to a [`LanguageCode`].
pub struct LanguageDetector {
    re_audio_field: Regex,
}

impl LanguageDetector {
    /// # Errors
    ///
    /// Returns `CapsortError::RegexError` if the label pattern fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            re_audio_field: Regex::new(r"(?i)(?:Aᴜᴅɪᴏ|Audio)\s*:\s*([^,\n\]]+)")?,
        })
    }

    /// Detects the language, preferring an `AUDIO:` field over the whole text.
    #[must_use]
    pub fn detect(&self, text: &str) -> Option<LanguageCode> {
        if let Some(caps) = self.re_audio_field.captures(text) {
            let value = caps[1].trim().to_lowercase();
            if let Some(code) = lookup(&value) {
                debug!(%code, "language from audio field");
                return Some(code);
            }
        }

        lookup(&text.to_lowercase())
    }

    /// Canonical code string, empty when nothing is recognized.
    #[must_use]
    pub fn extract(&self, text: &str) -> String {
        self.detect(text)
            .map(|code| code.as_str().to_string())
            .unwrap_or_default()
    }
}

fn lookup(lowered: &str) -> Option<LanguageCode> {
    LANGUAGE_TABLE
        .iter()
        .find(|(key, _)| lowered.contains(key))
        .map(|&(_, code)| code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> LanguageDetector {
        LanguageDetector::new().unwrap()
    }

    #[test]
    fn audio_field_takes_precedence() {
        let d = detector();
        // Whole-text scan alone would hit "tamil" in the title first.
        assert_eq!(
            d.detect("Tamil Rockers Special\nAudio: English, Japanese"),
            Some(LanguageCode::Eng)
        );
        assert_eq!(d.detect("Aᴜᴅɪᴏ : Multi Audio"), Some(LanguageCode::Multi));
    }

    #[test]
    fn unmatched_audio_field_falls_back_to_full_text() {
        let d = detector();
        assert_eq!(
            d.detect("Audio: Japanese\nNaruto Dual [720p]"),
            Some(LanguageCode::Dual)
        );
    }

    #[test]
    fn table_order_breaks_ties() {
        let d = detector();
        // "tam" precedes "eng" in the table regardless of position in text.
        assert_eq!(d.detect("english and tamil"), Some(LanguageCode::Tam));
        assert_eq!(d.detect("dual multi"), Some(LanguageCode::Multi));
    }

    #[test]
    fn table_order_is_stable() {
        let keys: Vec<&str> = LANGUAGE_TABLE.iter().map(|(key, _)| *key).collect();
        assert_eq!(
            keys,
            ["தமிழ்", "tamil", "tam", "english", "eng", "multi audio", "multi", "dual audio", "dual"]
        );
    }

    #[test]
    fn native_script_is_recognized() {
        let d = detector();
        assert_eq!(d.extract("நருடோ தமிழ்"), "Tam");
    }

    #[test]
    fn unknown_language_is_empty() {
        let d = detector();
        assert_eq!(d.extract("Naruto [S01 E05] [1080p]"), "");
        assert_eq!(d.extract(""), "");
    }
}
