use regex::Regex;
use tracing::warn;

use crate::error::Result;
use crate::types::{FileKind, FileMetadata, Quality};

/// Derives [`FileMetadata`] for files collected during a sequencing session.
///
/// Only the canonical `[S01-E07] Name [1080P] [Single].mkv` shape is
/// understood here; anything else leaves the field `None`.
pub struct FileTagParser {
    re_episode: Regex,
    re_quality: Regex,
}

impl FileTagParser {
    /// # Errors
    ///
    /// Returns `CapsortError::RegexError` if a pattern fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            re_episode: Regex::new(r"\[S\d+-E(\d+)\]")?,
            // Greedy gap: the last bracketed number on the line is the quality.
            re_quality: Regex::new(r"\[S\d+-E\d+\].*\[(\d+)(P)?\]")?,
        })
    }

    /// Builds the metadata for one file. Filename is searched before caption.
    #[must_use]
    pub fn ingest(
        &self,
        file_id: impl Into<String>,
        filename: impl Into<String>,
        caption: impl Into<String>,
        kind: FileKind,
    ) -> FileMetadata {
        let filename = filename.into();
        let caption = caption.into();

        let episode_number = self.episode_number(&filename, &caption);
        let video_quality = self.video_quality(&filename, &caption);
        if episode_number.is_none() || video_quality.is_none() {
            warn!(%filename, "file carries no usable [S..-E..] / quality tag");
        }

        FileMetadata {
            file_id: file_id.into(),
            filename,
            caption,
            kind,
            episode_number,
            video_quality,
        }
    }

    fn episode_number(&self, filename: &str, caption: &str) -> Option<u32> {
        [filename, caption]
            .into_iter()
            .find_map(|text| self.re_episode.captures(text))
            .and_then(|c| c[1].parse().ok())
    }

    /// The first text containing the tag shape decides, even when its number
    /// is not a recognized quality.
    fn video_quality(&self, filename: &str, caption: &str) -> Option<Quality> {
        [filename, caption]
            .into_iter()
            .find_map(|text| self.re_quality.captures(text))
            .and_then(|c| Quality::from_digits(&c[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> FileTagParser {
        FileTagParser::new().unwrap()
    }

    #[test]
    fn canonical_filename() {
        let p = parser();
        let f = p.ingest(
            "id1",
            "[S01-E07] Naruto Tam [1080P] [Single].mkv",
            "",
            FileKind::Document,
        );
        assert_eq!(f.episode_number, Some(7));
        assert_eq!(f.video_quality, Some(Quality::FHD1080));
        assert!(f.is_deliverable());
    }

    #[test]
    fn caption_is_searched_after_filename() {
        let p = parser();
        let f = p.ingest(
            "id2",
            "video_abc.mp4",
            "/leech -n [S01-E12] Bleach [480P] [Single].mp4",
            FileKind::Video,
        );
        assert_eq!(f.episode_number, Some(12));
        assert_eq!(f.video_quality, Some(Quality::SD480));
    }

    #[test]
    fn unrecognized_quality_in_filename_is_final() {
        let p = parser();
        let f = p.ingest(
            "id3",
            "[S01-E02] Show [999P].mkv",
            "[S01-E02] Show [720P].mkv",
            FileKind::Document,
        );
        assert_eq!(f.episode_number, Some(2));
        assert_eq!(f.video_quality, None);
    }

    #[test]
    fn untagged_file_has_no_metadata() {
        let p = parser();
        let f = p.ingest("id4", "random.mkv", "hello", FileKind::Document);
        assert_eq!(f.episode_number, None);
        assert_eq!(f.video_quality, None);
        assert!(!f.is_deliverable());
    }

    #[test]
    fn episode_without_quality() {
        let p = parser();
        let f = p.ingest("id5", "[S02-E03] Show.mkv", "", FileKind::Document);
        assert_eq!(f.episode_number, Some(3));
        assert_eq!(f.video_quality, None);
    }
}
