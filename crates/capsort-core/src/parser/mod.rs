pub mod bulk;
pub mod episode;
pub mod file;
pub mod language;
pub mod link;
pub mod name;
pub mod quality;

pub use bulk::BulkLineParser;
pub use episode::{EpisodeInfoExtractor, EpisodePattern};
pub use file::FileTagParser;
pub use language::{LanguageDetector, LANGUAGE_TABLE};
pub use link::{LinkInfo, LinkParser, SearchFilter};
pub use name::{NameCleaner, UNKNOWN_ANIME};
pub use quality::{QualityNormalizer, QualityPattern};
