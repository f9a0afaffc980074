use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::types::{BulkEntry, FileType};

/// Header glyph of bulk listings; lines starting with it are decoration.
const HEADER_MARKER: char = '📦';

/// Quality assumed when a line carries no quality bracket.
const DEFAULT_BULK_QUALITY: &str = "720p";

/// Parses bulk listing messages of the shape `<n>. <content> - <url>`.
pub struct BulkLineParser {
    re_line: Regex,
    re_detect: Regex,
    re_bracket: Regex,
    re_episode_tag: Regex,
    re_quality_tag: Regex,
    re_extension: Regex,
    re_whitespace: Regex,
}

impl BulkLineParser {
    /// # Errors
    ///
    /// Returns `CapsortError::RegexError` if a pattern fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            re_line: Regex::new(r"^(\d+)\.\s*(.+?)\s*-\s*(https?://\S+)$")?,
            re_detect: Regex::new(r"\d+\.\s*.*?https?://")?,
            re_bracket: Regex::new(r"\[([^\]]+)\]")?,
            re_episode_tag: Regex::new(r"(?i)^(?:S\d+-?E\d+|S\d+-\d+|EP?\d+)")?,
            re_quality_tag: Regex::new(r"(?i)^(\d{3,4})p?$")?,
            re_extension: Regex::new(r"(?i)\.(?:mkv|mp4|avi)$")?,
            re_whitespace: Regex::new(r"\s+")?,
        })
    }

    /// Returns `true` if the text looks like a bulk listing at all.
    ///
    /// Callers use this to route a message to [`parse_message`](Self::parse_message)
    /// rather than to the caption formatter.
    #[must_use]
    pub fn looks_like_bulk(&self, text: &str) -> bool {
        self.re_detect.is_match(text)
    }

    /// Parses every line of a listing, silently skipping lines that do not
    /// have the `<n>. <content> - <url>` shape.
    #[must_use]
    pub fn parse_message(&self, text: &str) -> Vec<BulkEntry> {
        let entries: Vec<BulkEntry> = text
            .trim()
            .lines()
            .filter_map(|line| self.parse_line(line))
            .collect();
        debug!(count = entries.len(), "parsed bulk listing");
        entries
    }

    /// Parses one line; `None` for blank, header or malformed lines.
    #[must_use]
    pub fn parse_line(&self, line: &str) -> Option<BulkEntry> {
        let line = line.trim();
        if line.is_empty() || line.starts_with(HEADER_MARKER) {
            return None;
        }

        let caps = self.re_line.captures(line)?;
        let entry_number = &caps[1];
        let content = caps[2].trim();
        let url = caps[3].to_string();

        let mut episode_tag = format!("EP{entry_number}");
        let mut quality = DEFAULT_BULK_QUALITY.to_string();
        let mut file_type = FileType::default();

        for span in self.re_bracket.captures_iter(content) {
            let span = &span[1];
            if self.re_episode_tag.is_match(span) {
                episode_tag = span.to_string();
            } else if let Some(q) = self.re_quality_tag.captures(span) {
                quality = format!("{}p", &q[1]);
            } else if let Some(kind) = FileType::from_label(span) {
                file_type = kind;
            }
        }

        Some(BulkEntry {
            anime_name: self.title(content, entry_number),
            episode_tag,
            quality,
            file_type,
            file_name: content.to_string(),
            url,
        })
    }

    fn title(&self, content: &str, entry_number: &str) -> String {
        let without_spans = self.re_bracket.replace_all(content, "");
        let without_ext = self.re_extension.replace(without_spans.trim(), "");
        let title = self
            .re_whitespace
            .replace_all(&without_ext, " ")
            .trim()
            .to_string();

        if title.is_empty() {
            format!("Unknown Anime {entry_number}")
        } else {
            title
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> BulkLineParser {
        BulkLineParser::new().unwrap()
    }

    #[test]
    fn canonical_line() {
        let p = parser();
        let entry = p
            .parse_line("1. [S01-E01] My Show [720p] - https://x/a.mkv")
            .unwrap();

        assert_eq!(entry.anime_name, "My Show");
        assert_eq!(entry.episode_tag, "S01-E01");
        assert_eq!(entry.quality, "720p");
        assert_eq!(entry.file_type, FileType::Single);
        assert_eq!(entry.file_name, "[S01-E01] My Show [720p]");
        assert_eq!(entry.url, "https://x/a.mkv");
    }

    #[test]
    fn defaults_from_entry_number() {
        let p = parser();
        let entry = p.parse_line("12. Frieren - http://cdn.example/f.mkv").unwrap();
        assert_eq!(entry.episode_tag, "EP12");
        assert_eq!(entry.quality, "720p");
        assert_eq!(entry.anime_name, "Frieren");
    }

    #[test]
    fn span_classification() {
        let p = parser();
        let entry = p
            .parse_line("3. Bleach [E05] [1080] [batch] [HEVC] - https://x/b")
            .unwrap();
        assert_eq!(entry.episode_tag, "E05");
        assert_eq!(entry.quality, "1080p");
        assert_eq!(entry.file_type, FileType::Batch);
        // Unclassified spans are still stripped from the title.
        assert_eq!(entry.anime_name, "Bleach");
        assert_eq!(entry.file_name, "Bleach [E05] [1080] [batch] [HEVC]");
    }

    #[test]
    fn quality_suffix_is_lowercased() {
        let p = parser();
        let entry = p.parse_line("4. Show [480P] - https://x/c").unwrap();
        assert_eq!(entry.quality, "480p");
    }

    #[test]
    fn extension_removed_and_fallback_title() {
        let p = parser();
        let entry = p
            .parse_line("5. One Piece  Film.MKV - https://x/d")
            .unwrap();
        assert_eq!(entry.anime_name, "One Piece Film");

        let entry = p.parse_line("6. [S01E06] [720p] - https://x/e").unwrap();
        assert_eq!(entry.anime_name, "Unknown Anime 6");
        assert_eq!(entry.episode_tag, "S01E06");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let p = parser();
        assert!(p.parse_line("1. My Show [720p]").is_none());
        assert!(p.parse_line("My Show - https://x/a.mkv").is_none());
        assert!(p.parse_line("1. My Show - ftp://x/a.mkv").is_none());
        assert!(p.parse_line("").is_none());
        assert!(p.parse_line("📦 Batch upload 1. x - https://x/a").is_none());
    }

    #[test]
    fn dashes_inside_content() {
        let p = parser();
        let entry = p
            .parse_line("7. Re-Zero - Starting Life [S02-E01] - https://x/f")
            .unwrap();
        assert_eq!(entry.anime_name, "Re-Zero - Starting Life");
        assert_eq!(entry.url, "https://x/f");
    }

    #[test]
    fn whole_message() {
        let p = parser();
        let text = "📦 Weekly batch\n\
                    1. [S01-E01] My Show [720p] - https://x/1\n\
                    \n\
                    not a listing line\n\
                    2. [S01-E02] My Show [1080p] [Dual] - https://x/2\n";
        assert!(p.looks_like_bulk(text));

        let entries = p.parse_message(text);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].episode_tag, "S01-E02");
        assert_eq!(entries[1].file_type, FileType::Dual);
    }

    #[test]
    fn detection_requires_numbered_link() {
        let p = parser();
        assert!(!p.looks_like_bulk("Naruto [S01 E05] [1080p]"));
        assert!(p.looks_like_bulk("see 1. this https://x"));
    }
}
