use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::types::EpisodeInfo;
use crate::types::episode::DEFAULT_NUMBER;

/// Small-caps "EPISODE" label used by structured post templates.
const EPISODE_LABEL: &str = "Eᴘɪꜱᴏᴅᴇ";
/// Television marker that opens the title line of structured posts.
const TV_MARKER: char = '📺';

/// Season/episode pattern families, in evaluation order.
///
/// The order is part of the contract: each family is looser than the one
/// before it, so e.g. a channel post must be tried before the bare
/// `S01 EP05` family or its title would swallow the channel handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodePattern {
    /// `📺 Title [S01]` plus an `Eᴘɪꜱᴏᴅᴇ: 5` field.
    StructuredEmoji,
    /// `@channel - Title S01 EP05` or `@channel - [S01 EP05] Title [...]`.
    ChannelPrefixed,
    /// `[S01 E05]`, `[S01 EP05]` or the canonical `[S01-E05]`.
    BracketedSeasonEpisode,
    /// `S01 E05`, `S01EP05` anywhere in the text.
    SeasonEpisode,
}

impl EpisodePattern {
    pub const ORDER: [EpisodePattern; 4] = [
        Self::StructuredEmoji,
        Self::ChannelPrefixed,
        Self::BracketedSeasonEpisode,
        Self::SeasonEpisode,
    ];
}

/// Recovers `(season, episode, title)` from free text.
pub struct EpisodeInfoExtractor {
    re_emoji_title: Regex,
    re_emoji_episode: Regex,
    re_channel_title_first: Regex,
    re_channel_season_first: Regex,
    re_bracketed: [Regex; 2],
    re_bracket_split: Regex,
    re_plain: [Regex; 2],
    re_plain_split: Regex,
}

impl EpisodeInfoExtractor {
    /// Constructs a new `EpisodeInfoExtractor` with pre-compiled patterns.
    ///
    /// # Errors
    ///
    /// Returns `CapsortError::RegexError` if any pattern fails to compile
    /// (should never happen with the static patterns defined here).
    pub fn new() -> Result<Self> {
        Ok(Self {
            re_emoji_title: Regex::new(r"(?i)📺\s*([^\[]+)\s*\[S(\d+)\]")?,
            re_emoji_episode: Regex::new(r"(?i)Eᴘɪꜱᴏᴅᴇ\s*:\s*(\d+)")?,
            re_channel_title_first: Regex::new(r"(?i)@\w+\s*-\s*(.+?)\s+S(\d+)\s*EP(\d+)")?,
            re_channel_season_first: Regex::new(
                r"(?i)@\w+\s*-\s*\[S(\d+)\s*EP(\d+)\]\s*(.+?)(?:\s*\[|$)",
            )?,
            re_bracketed: [
                Regex::new(r"(?i)\[S(\d+)\s*-?\s*E(\d+)\]")?,
                Regex::new(r"(?i)\[S(\d+)\s*-?\s*EP(\d+)\]")?,
            ],
            re_bracket_split: Regex::new(r"(?i)\[S\d+")?,
            re_plain: [
                Regex::new(r"(?i)S(\d+)\s*-?\s*E(\d+)")?,
                Regex::new(r"(?i)S(\d+)\s*-?\s*EP(\d+)")?,
            ],
            re_plain_split: Regex::new(r"(?i)S\d+")?,
        })
    }

    /// Extracts episode info, defaulting to `"01"`/`"01"` and the whole
    /// trimmed input as title when no family matches.
    #[must_use]
    pub fn extract(&self, text: &str) -> EpisodeInfo {
        self.extract_split(text, text)
    }

    /// Like [`extract`](Self::extract), but the channel family reads `original`
    /// while every other family reads `stripped` (the text after a leading
    /// `@channel - ` separator has been dropped).
    #[must_use]
    pub fn extract_split(&self, original: &str, stripped: &str) -> EpisodeInfo {
        let original = original.trim();
        let stripped = stripped.trim();

        for family in EpisodePattern::ORDER {
            let input = match family {
                EpisodePattern::ChannelPrefixed => original,
                _ => stripped,
            };
            if let Some(info) = self.try_family(family, input) {
                debug!(?family, season = %info.season, episode = %info.episode, "episode pattern matched");
                return info;
            }
        }

        EpisodeInfo::fallback(stripped)
    }

    fn try_family(&self, family: EpisodePattern, text: &str) -> Option<EpisodeInfo> {
        match family {
            EpisodePattern::StructuredEmoji => self.structured(text),
            EpisodePattern::ChannelPrefixed => self.channel(text),
            EpisodePattern::BracketedSeasonEpisode => {
                Self::season_episode(&self.re_bracketed, &self.re_bracket_split, text)
            }
            EpisodePattern::SeasonEpisode => {
                Self::season_episode(&self.re_plain, &self.re_plain_split, text)
            }
        }
    }

    /// Matches whenever both markers are present; the sub-fields default
    /// independently.
    fn structured(&self, text: &str) -> Option<EpisodeInfo> {
        if !(text.contains(TV_MARKER) && text.contains(EPISODE_LABEL)) {
            return None;
        }

        let (title, season) = self
            .re_emoji_title
            .captures(text)
            .map(|c| (c[1].trim().to_string(), c[2].to_string()))
            .unwrap_or_else(|| (String::new(), DEFAULT_NUMBER.to_string()));

        let episode = self
            .re_emoji_episode
            .captures(text)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| DEFAULT_NUMBER.to_string());

        Some(EpisodeInfo::new(&season, &episode, title))
    }

    fn channel(&self, text: &str) -> Option<EpisodeInfo> {
        if let Some(c) = self.re_channel_title_first.captures(text) {
            return Some(EpisodeInfo::new(&c[2], &c[3], c[1].trim()));
        }
        self.re_channel_season_first
            .captures(text)
            .map(|c| EpisodeInfo::new(&c[1], &c[2], c[3].trim()))
    }

    /// Alternatives are tried in order over the whole text; the title is
    /// whatever precedes the first season token.
    fn season_episode(alternatives: &[Regex], split: &Regex, text: &str) -> Option<EpisodeInfo> {
        let caps = alternatives.iter().find_map(|re| re.captures(text))?;
        let title = split
            .find(text)
            .map_or(text, |m| &text[..m.start()])
            .trim();
        Some(EpisodeInfo::new(&caps[1], &caps[2], title))
    }
}
