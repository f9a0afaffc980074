pub mod formatter;
pub mod rotation;

pub use formatter::{CaptionFormatter, CaptionParts, FormatterConfig};
pub use rotation::{
    CaptionState, DEFAULT_PREFIXES, DEFAULT_ROTATION_PERIOD, FALLBACK_PREFIX, PrefixRotation,
};
