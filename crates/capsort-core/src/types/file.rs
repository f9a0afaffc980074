use std::fmt;

use serde::{Deserialize, Serialize};

use super::quality::Quality;

/// How the transport delivered a file; decides how it is re-sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    #[default]
    Document,
    Video,
}

impl FileKind {
    /// Name used when the transport supplies no filename.
    #[must_use]
    pub fn default_filename(self, file_id: &str) -> String {
        match self {
            Self::Document => "unknown_document".to_string(),
            Self::Video => {
                let short: String = file_id.chars().take(8).collect();
                format!("video_{short}.mp4")
            }
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => write!(f, "document"),
            Self::Video => write!(f, "video"),
        }
    }
}

/// A file collected during a sequencing session.
///
/// Episode number and quality are derived once, at ingestion, from the
/// filename and caption (see [`crate::parser::FileTagParser`]). `None` means
/// the text carried no recognizable tag, which is a normal outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Opaque transport handle.
    pub file_id: String,
    pub filename: String,
    pub caption: String,
    pub kind: FileKind,
    pub episode_number: Option<u32>,
    pub video_quality: Option<Quality>,
}

impl FileMetadata {
    /// Returns `true` if both episode and quality were recovered.
    #[must_use]
    pub fn is_deliverable(&self) -> bool {
        self.episode_number.is_some() && self.video_quality.is_some()
    }

    /// Human-readable ingestion status.
    #[must_use]
    pub fn status_line(&self) -> String {
        match (self.episode_number, self.video_quality) {
            (Some(ep), Some(q)) => format!("Episode {ep}, Quality {q}"),
            _ => "Could not parse episode/quality info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(episode: Option<u32>, quality: Option<Quality>) -> FileMetadata {
        FileMetadata {
            file_id: "BQACAgUAAxkBAAIB".into(),
            filename: "x.mkv".into(),
            caption: String::new(),
            kind: FileKind::Video,
            episode_number: episode,
            video_quality: quality,
        }
    }

    #[test]
    fn default_filenames() {
        assert_eq!(FileKind::Document.default_filename("abc"), "unknown_document");
        assert_eq!(
            FileKind::Video.default_filename("BQACAgUAAxkBAAIB"),
            "video_BQACAgUA.mp4"
        );
        assert_eq!(FileKind::Video.default_filename("ab"), "video_ab.mp4");
    }

    #[test]
    fn status_line_needs_both_fields() {
        assert_eq!(
            file(Some(7), Some(Quality::FHD1080)).status_line(),
            "Episode 7, Quality 1080p"
        );
        assert_eq!(
            file(Some(7), None).status_line(),
            "Could not parse episode/quality info"
        );
        assert!(!file(None, Some(Quality::HD720)).is_deliverable());
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&FileKind::Video).unwrap(), "\"video\"");
        let back: FileKind = serde_json::from_str("\"document\"").unwrap();
        assert_eq!(back, FileKind::Document);
    }
}
