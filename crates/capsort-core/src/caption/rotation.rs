use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::info;

use crate::error::{CapsortError, Result};

/// Prefix used when the rotation list is empty.
pub const FALLBACK_PREFIX: &str = "/leech -n";

/// Prefix list a fresh rotation starts with.
pub const DEFAULT_PREFIXES: [&str; 6] = [
    "/leech -n",
    "/leech1 -n",
    "/leech2 -n",
    "/leechx -n",
    "/leech3 -n",
    "/leech5 -n",
];

/// Number of formatted captions that share one prefix before rotating.
pub const DEFAULT_ROTATION_PERIOD: u64 = 3;

/// Rotating caption prefixes plus the processed-message counter.
///
/// Call `n` (1-based) selects `prefixes[((n - 1) / period) % len]`. The
/// counter only grows and lives as long as the value does; it is never
/// persisted. One rotation is shared by every requester that formats through
/// the same [`CaptionState`], so the selected prefix follows the global call
/// order rather than any single requester's.
#[derive(Debug)]
pub struct PrefixRotation {
    prefixes: RwLock<Vec<String>>,
    message_count: AtomicU64,
    period: u64,
}

impl Default for PrefixRotation {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIXES.iter().map(|p| (*p).to_string()).collect())
    }
}

impl PrefixRotation {
    /// Creates a rotation over `prefixes` with the default period of 3.
    #[must_use]
    pub fn new(prefixes: Vec<String>) -> Self {
        Self::with_period(prefixes, DEFAULT_ROTATION_PERIOD)
    }

    /// Creates a rotation with a custom period (clamped to at least 1).
    #[must_use]
    pub fn with_period(prefixes: Vec<String>, period: u64) -> Self {
        Self {
            prefixes: RwLock::new(prefixes),
            message_count: AtomicU64::new(0),
            period: period.max(1),
        }
    }

    /// Counts one processed message and returns the prefix selected for it.
    pub fn next_prefix(&self) -> String {
        let previous = self.message_count.fetch_add(1, Ordering::SeqCst);
        self.select(previous)
    }

    /// The prefix the next call to [`next_prefix`](Self::next_prefix) would
    /// select, without counting a message.
    #[must_use]
    pub fn upcoming_prefix(&self) -> String {
        self.select(self.message_count.load(Ordering::SeqCst))
    }

    /// Messages processed so far.
    #[must_use]
    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn period(&self) -> u64 {
        self.period
    }

    /// Snapshot of the prefix list.
    #[must_use]
    pub fn prefixes(&self) -> Vec<String> {
        self.prefixes.read().clone()
    }

    /// Appends a prefix and returns the new list length.
    ///
    /// # Errors
    ///
    /// `EmptyPrefix` for blank input, `DuplicatePrefix` if already listed.
    pub fn add_prefix(&self, prefix: &str) -> Result<usize> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(CapsortError::EmptyPrefix);
        }

        let mut prefixes = self.prefixes.write();
        if prefixes.iter().any(|p| p == prefix) {
            return Err(CapsortError::DuplicatePrefix(prefix.to_string()));
        }
        prefixes.push(prefix.to_string());
        info!(prefix, total = prefixes.len(), "prefix added");
        Ok(prefixes.len())
    }

    /// Removes the prefix at a 1-based `index` and returns it.
    ///
    /// # Errors
    ///
    /// `InvalidPrefixIndex` when `index` is outside `1..=len`.
    pub fn remove_prefix(&self, index: usize) -> Result<String> {
        let mut prefixes = self.prefixes.write();
        let len = prefixes.len();
        if index == 0 || index > len {
            return Err(CapsortError::InvalidPrefixIndex { index, len });
        }
        let removed = prefixes.remove(index - 1);
        info!(prefix = %removed, remaining = prefixes.len(), "prefix removed");
        Ok(removed)
    }

    fn select(&self, zero_based_call: u64) -> String {
        let prefixes = self.prefixes.read();
        if prefixes.is_empty() {
            return FALLBACK_PREFIX.to_string();
        }
        let slot = (zero_based_call / self.period) % prefixes.len() as u64;
        prefixes[slot as usize].clone()
    }
}

/// Formatter state shared process-wide: the prefix rotation and the optional
/// fixed anime name that overrides auto-detection.
#[derive(Debug, Default)]
pub struct CaptionState {
    pub rotation: PrefixRotation,
    fixed_name: RwLock<Option<String>>,
}

impl CaptionState {
    #[must_use]
    pub fn new(rotation: PrefixRotation, fixed_name: Option<String>) -> Self {
        let state = Self {
            rotation,
            fixed_name: RwLock::new(None),
        };
        state.set_fixed_name(fixed_name);
        state
    }

    /// Current override, if any.
    #[must_use]
    pub fn fixed_name(&self) -> Option<String> {
        self.fixed_name.read().clone()
    }

    /// Sets or clears the override. Blank names clear it.
    pub fn set_fixed_name(&self, name: Option<String>) {
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        info!(fixed_name = ?name, "fixed anime name updated");
        *self.fixed_name.write() = name;
    }
}
