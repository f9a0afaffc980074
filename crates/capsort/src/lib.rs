//! # Capsort
//!
//! Episode caption parsing, canonical caption formatting and quality-ordered
//! file sequencing. This crate re-exports [`capsort_core`]; see its
//! documentation for the full API.
//!
//! ```rust
//! use capsort::{Engine, FormatterConfig};
//!
//! let engine = Engine::new(FormatterConfig::default()).unwrap();
//! let info = engine.extract_episode_info("@AnimeHub - Jujutsu Kaisen S02 EP14 [720p]");
//! assert_eq!(info.tag(), "[S02-E14]");
//! assert_eq!(info.title, "Jujutsu Kaisen");
//! ```
pub use capsort_core::*;
