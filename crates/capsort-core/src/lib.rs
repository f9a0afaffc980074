//! # Capsort Core
//!
//! Extraction and ordering engine for episode captions. Recovers season,
//! episode, quality, language and title from loosely written captions and
//! filenames, rewrites them into one canonical caption line, parses bulk
//! link listings, and orders a collected batch of files by quality and
//! episode for delivery.
//!
//! ## Quick Start
//!
//! ```rust
//! use capsort_core::{Engine, FormatterConfig, RequesterId};
//!
//! let engine = Engine::new(FormatterConfig::new().with_prefixes(["/leech -n"])).unwrap();
//! let caption = engine.format_caption("Naruto Shippuden [S01 E05] [1080p] Tamil.mkv", RequesterId(1));
//!
//! assert_eq!(caption, "/leech -n [S01-E05] Naruto Shippuden Tam [1080P] [Single].mkv");
//! ```
pub mod caption;
pub mod engine;
pub mod error;
pub mod parser;
pub mod sequence;
pub mod store;
pub mod types;

// Re-export primary API
pub use caption::{CaptionFormatter, CaptionParts, CaptionState, FormatterConfig, PrefixRotation};
pub use engine::Engine;
pub use error::{CapsortError, Result};
pub use parser::{
    BulkLineParser, EpisodeInfoExtractor, FileTagParser, LanguageDetector, LinkInfo, LinkParser,
    NameCleaner, QualityNormalizer, SearchFilter,
};
pub use sequence::{
    BeginOutcome, Bucket, DeliveryGroup, DeliveryPlan, SequenceSummary, Sequencer, SessionStore,
};
pub use store::{AnimeId, EpisodeId, EpisodeStore, MemoryStore, StoreReport, store_entries};
pub use types::{
    BulkEntry, EpisodeInfo, FileKind, FileMetadata, FileType, LanguageCode, Quality, RequesterId,
};
