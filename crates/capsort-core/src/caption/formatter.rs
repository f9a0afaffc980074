//! # Caption Formatter
//!
//! Composes the extractors into one canonical caption line:
//!
//! ```text
//! <prefix> [S<SS>-E<EE>] <name> [<Q>P] [Single]<.ext>
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rotation::{CaptionState, DEFAULT_PREFIXES, DEFAULT_ROTATION_PERIOD, PrefixRotation};
use crate::error::{CapsortError, Result};
use crate::parser::{
    EpisodeInfoExtractor, LanguageDetector, NameCleaner, QualityNormalizer, UNKNOWN_ANIME,
};
use crate::types::{EpisodeInfo, Quality, RequesterId};

/// Extensions recognized in captions, in priority order; `.mkv` otherwise.
const EXTENSIONS: [&str; 2] = [".mp4", ".avi"];
const DEFAULT_EXTENSION: &str = ".mkv";

/// Configuration for the caption formatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    /// Prefixes rotated through, in order.
    pub prefixes: Vec<String>,
    /// Name that replaces auto-detection when set.
    pub fixed_name: Option<String>,
    /// Quality used when the text carries none.
    pub default_quality: Quality,
    /// Captions per prefix before rotating.
    pub rotation_period: u64,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            prefixes: DEFAULT_PREFIXES.iter().map(|p| (*p).to_string()).collect(),
            fixed_name: None,
            default_quality: Quality::default(),
            rotation_period: DEFAULT_ROTATION_PERIOD,
        }
    }
}

impl FormatterConfig {
    /// Create a new formatter configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the prefix list.
    pub fn with_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Set a fixed anime name.
    pub fn with_fixed_name(mut self, name: impl Into<String>) -> Self {
        self.fixed_name = Some(name.into());
        self
    }

    /// Set the fallback quality.
    pub fn with_default_quality(mut self, quality: Quality) -> Self {
        self.default_quality = quality;
        self
    }

    /// Set the rotation period (at least 1).
    pub fn with_rotation_period(mut self, period: u64) -> Self {
        self.rotation_period = period.max(1);
        self
    }

    /// Checks the prefix list a deserialized config may carry. A zero
    /// rotation period is not an error; it is clamped to 1.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for blank or duplicate prefixes.
    pub fn validate(&self) -> Result<()> {
        for (i, prefix) in self.prefixes.iter().enumerate() {
            if prefix.trim().is_empty() {
                return Err(CapsortError::InvalidConfig(format!(
                    "prefix {} is blank",
                    i + 1
                )));
            }
            if self.prefixes[..i].contains(prefix) {
                return Err(CapsortError::InvalidConfig(format!(
                    "prefix {prefix:?} is listed twice"
                )));
            }
        }
        Ok(())
    }

    /// Builds the shared state this configuration describes.
    #[must_use]
    pub fn build_state(&self) -> CaptionState {
        CaptionState::new(
            PrefixRotation::with_period(self.prefixes.clone(), self.rotation_period),
            self.fixed_name.clone(),
        )
    }
}

/// The pieces of one formatted caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionParts {
    pub prefix: String,
    pub episode: EpisodeInfo,
    /// Resolved display name, language code appended when detected.
    pub name: String,
    /// Caption spelling, e.g. `"1080P"`.
    pub quality: String,
    /// Detected language code, empty when unknown.
    pub language: String,
    /// Extension including the dot.
    pub extension: String,
}

impl fmt::Display for CaptionParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} [{}] [Single]{}",
            self.prefix,
            self.episode.tag(),
            self.name,
            self.quality,
            self.extension
        )
    }
}

/// Turns free-form captions into canonical caption lines.
pub struct CaptionFormatter {
    config: FormatterConfig,
    state: Arc<CaptionState>,
    pub(crate) episodes: EpisodeInfoExtractor,
    pub(crate) quality: QualityNormalizer,
    pub(crate) language: LanguageDetector,
    pub(crate) names: NameCleaner,
}

impl CaptionFormatter {
    /// Create a formatter with its own state built from `config`.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the configuration is inconsistent, `RegexError` if
    /// a pattern fails to compile.
    pub fn new(config: FormatterConfig) -> Result<Self> {
        config.validate()?;
        let state = Arc::new(config.build_state());
        Self::with_state(config, state)
    }

    /// Create a formatter that shares `state` with other formatters. The
    /// config's prefixes and fixed name are ignored in favour of the state's.
    ///
    /// # Errors
    ///
    /// `RegexError` if a pattern fails to compile.
    pub fn with_state(config: FormatterConfig, state: Arc<CaptionState>) -> Result<Self> {
        Ok(Self {
            config,
            state,
            episodes: EpisodeInfoExtractor::new()?,
            quality: QualityNormalizer::new()?,
            language: LanguageDetector::new()?,
            names: NameCleaner::new()?,
        })
    }

    /// Shared rotation / override state.
    pub fn state(&self) -> &Arc<CaptionState> {
        &self.state
    }

    /// Get the formatter configuration.
    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    /// Formats `text` into a canonical caption; empty output means the input
    /// was blank. Whitespace-only input counts as blank, so `"   "` yields
    /// `""` rather than a caption built from defaults.
    ///
    /// Every call counts one processed message on the shared rotation, blank
    /// input and test calls included.
    pub fn format(&self, text: &str, requester: RequesterId) -> String {
        self.compose(text, requester)
            .map(|parts| parts.to_string())
            .unwrap_or_default()
    }

    /// Like [`format`](Self::format) but returns the individual pieces.
    /// `None` for blank input.
    pub fn compose(&self, text: &str, requester: RequesterId) -> Option<CaptionParts> {
        let prefix = self.state.rotation.next_prefix();

        let original = text.trim();
        if original.is_empty() {
            debug!(%requester, "blank caption, nothing to format");
            return None;
        }

        let stripped = match original.split_once(" - ") {
            Some((_, rest)) if original.starts_with('@') => rest,
            _ => original,
        };

        let episode = self.episodes.extract_split(original, stripped);
        let quality = self
            .quality
            .extract(original)
            .unwrap_or(self.config.default_quality)
            .caption_label();
        let language = self.language.extract(original);

        let mut name = match self.state.fixed_name() {
            Some(fixed) => fixed,
            None => {
                let cleaned = self.names.clean(&episode.title);
                if cleaned.is_empty() {
                    UNKNOWN_ANIME.to_string()
                } else {
                    cleaned
                }
            }
        };
        if !language.is_empty() && !name.contains(&language) {
            name = format!("{name} {language}").trim().to_string();
        }

        let lowered = original.to_lowercase();
        let extension = EXTENSIONS
            .into_iter()
            .find(|ext| lowered.contains(ext))
            .unwrap_or(DEFAULT_EXTENSION)
            .to_string();

        let parts = CaptionParts {
            prefix,
            episode,
            name,
            quality,
            language,
            extension,
        };
        debug!(%requester, caption = %parts, "formatted caption");
        Some(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ME: RequesterId = RequesterId(1);

    fn formatter() -> CaptionFormatter {
        CaptionFormatter::new(FormatterConfig::new().with_prefixes(["/leech -n"])).unwrap()
    }

    #[test]
    fn bracketed_caption() {
        let f = formatter();
        assert_eq!(
            f.format("[S01 E05] Naruto [1080p] Tamil.mkv", ME),
            "/leech -n [S01-E05] Unknown Anime Tam [1080P] [Single].mkv"
        );
        assert_eq!(
            f.format("Naruto Shippuden [S01 E05] [1080p] Tamil.mkv", ME),
            "/leech -n [S01-E05] Naruto Shippuden Tam [1080P] [Single].mkv"
        );
    }

    #[test]
    fn channel_caption() {
        let f = formatter();
        assert_eq!(
            f.format("@Channel - Anime S01 EP12 [720] Tamil.mp4", ME),
            "/leech -n [S01-E12] Anime Tam [720P] [Single].mp4"
        );
    }

    #[test]
    fn quality_and_language_read_from_channel_handle() {
        let f = formatter();
        assert_eq!(
            f.format("@Tamil_Hub - Show S01 E02 [480p]", ME),
            "/leech -n [S01-E02] Show Tam [480P] [Single].mkv"
        );
        assert_eq!(
            f.format("@Hub_1080p - Show S01 E03", ME),
            "/leech -n [S01-E03] Show [1080P] [Single].mkv"
        );
    }

    #[test]
    fn language_not_duplicated() {
        let f = formatter();
        // "Tamil" is shortened to "Tam" by the cleaner, so the code is present.
        assert_eq!(
            f.format("Jujutsu Kaisen Tamil S02 E03 480p", ME),
            "/leech -n [S02-E03] Jujutsu Kaisen Tam [480P] [Single].mkv"
        );
    }

    #[test]
    fn extension_priority() {
        let f = formatter();
        let parts = f.compose("Show S01 E01 sample.avi and clip.mp4", ME).unwrap();
        assert_eq!(parts.extension, ".mp4");
        let parts = f.compose("Show S01 E01 file.AVI", ME).unwrap();
        assert_eq!(parts.extension, ".avi");
        let parts = f.compose("Show S01 E01", ME).unwrap();
        assert_eq!(parts.extension, ".mkv");
    }

    #[test]
    fn fixed_name_wins_over_detection() {
        let f = CaptionFormatter::new(
            FormatterConfig::new()
                .with_prefixes(["/leech -n"])
                .with_fixed_name("One Piece"),
        )
        .unwrap();
        assert_eq!(
            f.format("Random Title S01 E1000 [1080p] English", ME),
            "/leech -n [S01-E1000] One Piece Eng [1080P] [Single].mkv"
        );

        f.state().set_fixed_name(None);
        let parts = f.compose("Random Title S01 E02", ME).unwrap();
        assert_eq!(parts.name, "Random Title");
    }

    #[test]
    fn unparseable_caption_uses_defaults() {
        let f = formatter();
        assert_eq!(
            f.format("!!!", ME),
            "/leech -n [S01-E01] Unknown Anime [720P] [Single].mkv"
        );
    }

    #[test]
    fn default_quality_is_configurable() {
        let f = CaptionFormatter::new(
            FormatterConfig::new().with_default_quality(Quality::FHD1080),
        )
        .unwrap();
        let parts = f.compose("Show S01 E01", ME).unwrap();
        assert_eq!(parts.quality, "1080P");
    }

    #[test]
    fn empty_input_still_counts_a_message() {
        let f = formatter();
        assert_eq!(f.format("", ME), "");
        assert_eq!(f.format("   ", ME), "");
        assert_eq!(f.state().rotation.message_count(), 2);
    }

    #[test]
    fn rotation_is_shared_across_requesters() {
        let f = CaptionFormatter::new(FormatterConfig::new().with_prefixes(["a", "b"])).unwrap();
        let mut picked = Vec::new();
        for call in 0..6 {
            let requester = RequesterId(call % 2);
            picked.push(f.compose("Show S01 E01", requester).unwrap().prefix);
        }
        assert_eq!(picked, ["a", "a", "a", "b", "b", "b"]);
    }

    #[test]
    fn formatters_can_share_state() {
        let state = Arc::new(FormatterConfig::new().with_prefixes(["a", "b"]).build_state());
        let first = CaptionFormatter::with_state(FormatterConfig::new(), Arc::clone(&state)).unwrap();
        let second = CaptionFormatter::with_state(FormatterConfig::new(), Arc::clone(&state)).unwrap();

        first.format("x", ME);
        second.format("x", ME);
        first.format("x", ME);
        assert_eq!(second.compose("x", ME).unwrap().prefix, "b");
        assert_eq!(state.rotation.message_count(), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_calls_share_one_counter() {
        let f = Arc::new(
            CaptionFormatter::new(FormatterConfig::new().with_prefixes(["a", "b"])).unwrap(),
        );
        let mut handles = Vec::new();
        for user in 0..8_i64 {
            let f = Arc::clone(&f);
            handles.push(tokio::spawn(async move {
                let mut picked = Vec::new();
                for _ in 0..12 {
                    picked.push(f.compose("Show S01 E01", RequesterId(user)).unwrap().prefix);
                    tokio::task::yield_now().await;
                }
                picked
            }));
        }

        let mut a = 0;
        for handle in handles {
            a += handle.await.unwrap().iter().filter(|p| *p == "a").count();
        }
        // 96 calls over a period of 3 with two prefixes: exactly half pick "a".
        assert_eq!(f.state().rotation.message_count(), 96);
        assert_eq!(a, 48);
    }

    #[test]
    fn config_validation() {
        assert!(FormatterConfig::default().validate().is_ok());

        let config = FormatterConfig {
            rotation_period: 0,
            ..Default::default()
        };
        let f = CaptionFormatter::new(config).unwrap();
        assert_eq!(f.state().rotation.period(), 1);

        let config = FormatterConfig::new().with_prefixes(["a", "a"]);
        assert!(matches!(config.validate(), Err(CapsortError::InvalidConfig(_))));

        let config = FormatterConfig::new().with_prefixes(["a", " "]);
        assert!(CaptionFormatter::new(config).is_err());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: FormatterConfig =
            serde_json::from_str(r#"{"prefixes": ["/mirror -n"], "default_quality": "FHD1080"}"#)
                .unwrap();
        assert_eq!(config.prefixes, ["/mirror -n"]);
        assert_eq!(config.default_quality, Quality::FHD1080);
        assert_eq!(config.rotation_period, 3);
        assert_eq!(config.fixed_name, None);
    }
}
