pub mod bulk;
pub mod episode;
pub mod file;
pub mod quality;
pub mod requester;

pub use bulk::BulkEntry;
pub use episode::EpisodeInfo;
pub use file::{FileKind, FileMetadata};
pub use quality::{FileType, LanguageCode, Quality};
pub use requester::RequesterId;
