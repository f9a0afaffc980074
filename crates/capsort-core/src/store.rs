//! # Episode storage
//!
//! Bulk entries are persisted through the [`EpisodeStore`] collaborator. The
//! engine only drives it: [`store_entries`] walks a parsed listing, asks the
//! store to resolve each show and insert each episode, and reports what
//! happened. [`MemoryStore`] keeps everything in process memory and backs
//! dry runs and tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::Result;
use crate::types::BulkEntry;

/// Identifier the store assigned to a show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimeId(pub i64);

/// Identifier the store assigned to an episode row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpisodeId(pub i64);

impl fmt::Display for AnimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persistence collaborator for bulk entries.
pub trait EpisodeStore: Send + Sync {
    /// Returns the id of the show named exactly `name`, creating it if needed.
    ///
    /// # Errors
    ///
    /// `CapsortError::Store` when the backend fails.
    fn get_or_create_anime(&self, name: &str) -> Result<AnimeId>;

    /// Inserts an episode unless `(anime, episode tag, quality, url)` is
    /// already stored. `None` signals a duplicate.
    ///
    /// # Errors
    ///
    /// `CapsortError::Store` when the backend fails.
    fn insert_if_absent(&self, anime: AnimeId, entry: &BulkEntry) -> Result<Option<EpisodeId>>;
}

/// One stored episode as listed in a [`StoreReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEpisode {
    pub id: EpisodeId,
    pub episode_tag: String,
    pub quality: String,
}

/// Per-show section of a [`StoreReport`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeSummary {
    pub name: String,
    /// Only episodes inserted by this batch.
    pub episodes: Vec<StoredEpisode>,
}

/// Outcome of persisting a parsed bulk listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreReport {
    pub parsed: usize,
    pub stored: usize,
    /// Existing rows plus entries the store failed on.
    pub duplicates: usize,
    pub anime: BTreeMap<AnimeId, AnimeSummary>,
}

impl fmt::Display for StoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Processing Results:")?;
        writeln!(f, "- Parsed: {} entries", self.parsed)?;
        writeln!(f, "- Stored: {} new episodes", self.stored)?;
        write!(f, "- Duplicates: {}", self.duplicates)?;
        if !self.anime.is_empty() {
            write!(f, "\n\nAnime IDs:")?;
            for (id, show) in &self.anime {
                write!(f, "\n- ID {id}: {} ({} eps)", show.name, show.episodes.len())?;
            }
        }
        Ok(())
    }
}

/// Persists `entries` one by one. A failing entry is logged and counted as a
/// duplicate; the rest of the batch still runs.
pub fn store_entries<S>(store: &S, entries: &[BulkEntry]) -> StoreReport
where
    S: EpisodeStore + ?Sized,
{
    let mut report = StoreReport {
        parsed: entries.len(),
        ..Default::default()
    };

    for entry in entries {
        let anime = match store.get_or_create_anime(&entry.anime_name) {
            Ok(id) => id,
            Err(e) => {
                error!(anime = %entry.anime_name, error = %e, "could not resolve anime");
                report.duplicates += 1;
                continue;
            }
        };
        let section = report.anime.entry(anime).or_insert_with(|| AnimeSummary {
            name: entry.anime_name.clone(),
            episodes: Vec::new(),
        });

        match store.insert_if_absent(anime, entry) {
            Ok(Some(id)) => {
                report.stored += 1;
                section.episodes.push(StoredEpisode {
                    id,
                    episode_tag: entry.episode_tag.clone(),
                    quality: entry.quality.clone(),
                });
            }
            Ok(None) => {
                debug!(url = %entry.url, "duplicate episode skipped");
                report.duplicates += 1;
            }
            Err(e) => {
                error!(url = %entry.url, error = %e, "could not store episode");
                report.duplicates += 1;
            }
        }
    }

    report
}

#[derive(Default)]
struct MemoryTables {
    anime: HashMap<String, AnimeId>,
    names: BTreeMap<AnimeId, String>,
    episodes: BTreeMap<EpisodeId, (AnimeId, BulkEntry)>,
    keys: HashSet<(AnimeId, String, String, String)>,
    last_anime: i64,
    last_episode: i64,
}

/// In-process [`EpisodeStore`]. Ids start at 1 and are never reused.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<MemoryTables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn anime_count(&self) -> usize {
        self.tables.read().names.len()
    }

    #[must_use]
    pub fn episode_count(&self) -> usize {
        self.tables.read().episodes.len()
    }

    /// Shows with their stored episode counts, by id.
    #[must_use]
    pub fn anime_list(&self) -> Vec<(AnimeId, String, usize)> {
        let tables = self.tables.read();
        tables
            .names
            .iter()
            .map(|(&id, name)| {
                let count = tables.episodes.values().filter(|(a, _)| *a == id).count();
                (id, name.clone(), count)
            })
            .collect()
    }

    /// Stored links of one show, in insertion order.
    #[must_use]
    pub fn urls(&self, anime: AnimeId) -> Vec<String> {
        self.tables
            .read()
            .episodes
            .values()
            .filter(|(a, _)| *a == anime)
            .map(|(_, entry)| entry.url.clone())
            .collect()
    }

    /// Removes one episode row; `false` if it did not exist.
    pub fn delete_episode(&self, id: EpisodeId) -> bool {
        let mut tables = self.tables.write();
        match tables.episodes.remove(&id) {
            Some((anime, entry)) => {
                tables.keys.remove(&key(anime, &entry));
                true
            }
            None => false,
        }
    }

    /// Drops every show and episode. Id counters keep counting.
    pub fn clear(&self) {
        let mut tables = self.tables.write();
        tables.anime.clear();
        tables.names.clear();
        tables.episodes.clear();
        tables.keys.clear();
    }
}

fn key(anime: AnimeId, entry: &BulkEntry) -> (AnimeId, String, String, String) {
    (
        anime,
        entry.episode_tag.clone(),
        entry.quality.clone(),
        entry.url.clone(),
    )
}

impl EpisodeStore for MemoryStore {
    fn get_or_create_anime(&self, name: &str) -> Result<AnimeId> {
        let mut tables = self.tables.write();
        if let Some(&id) = tables.anime.get(name) {
            return Ok(id);
        }
        tables.last_anime += 1;
        let id = AnimeId(tables.last_anime);
        tables.anime.insert(name.to_string(), id);
        tables.names.insert(id, name.to_string());
        Ok(id)
    }

    fn insert_if_absent(&self, anime: AnimeId, entry: &BulkEntry) -> Result<Option<EpisodeId>> {
        let mut tables = self.tables.write();
        if !tables.keys.insert(key(anime, entry)) {
            return Ok(None);
        }
        tables.last_episode += 1;
        let id = EpisodeId(tables.last_episode);
        tables.episodes.insert(id, (anime, entry.clone()));
        Ok(Some(id))
    }
}
