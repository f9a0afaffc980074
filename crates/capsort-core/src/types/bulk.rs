use serde::{Deserialize, Serialize};

use super::quality::FileType;

/// One parsed line of a bulk listing.
///
/// `episode_tag` and `quality` stay strings: the tag is kept exactly as the
/// listing wrote it (`"S01-E01"`, `"EP4"`, ...) and quality is always a
/// `"<digits>p"` string, whether or not the digits are a recognized value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BulkEntry {
    /// Show name with bracket spans and extension removed.
    pub anime_name: String,
    /// Episode tag, `EP<entry number>` when the line carries none.
    pub episode_tag: String,
    /// Quality, always ending in a lower-case `p`; `"720p"` by default.
    pub quality: String,
    /// Release packaging, `Single` by default.
    pub file_type: FileType,
    /// The content part of the line verbatim, brackets retained.
    pub file_name: String,
    /// Download link.
    pub url: String,
}
