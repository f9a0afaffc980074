//! # Engine
//!
//! One handle over every operation a transport needs: caption formatting,
//! the individual extractors, bulk parsing, link search and the per-requester
//! sequencing sessions. Everything inside is `Send + Sync`, so an `Engine`
//! is shared between concurrent handlers behind an `Arc`.

use std::sync::Arc;

use crate::caption::{CaptionFormatter, CaptionState, FormatterConfig};
use crate::error::Result;
use crate::parser::{BulkLineParser, LinkInfo, LinkParser, SearchFilter};
use crate::sequence::{BeginOutcome, DeliveryPlan, SequenceSummary, SessionStore};
use crate::store::{EpisodeStore, StoreReport, store_entries};
use crate::types::{BulkEntry, EpisodeInfo, FileKind, FileMetadata, RequesterId};

/// Entry point bundling the formatter, parsers and session store.
pub struct Engine {
    formatter: CaptionFormatter,
    bulk: BulkLineParser,
    links: LinkParser,
    sessions: SessionStore,
}

impl Engine {
    /// Create an engine with the given formatter configuration.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for an inconsistent configuration, `RegexError` if a
    /// pattern fails to compile.
    pub fn new(config: FormatterConfig) -> Result<Self> {
        Ok(Self {
            formatter: CaptionFormatter::new(config)?,
            bulk: BulkLineParser::new()?,
            links: LinkParser::new()?,
            sessions: SessionStore::new()?,
        })
    }

    /// Create an engine whose formatter shares `state` with other engines.
    ///
    /// # Errors
    ///
    /// `RegexError` if a pattern fails to compile.
    pub fn with_state(config: FormatterConfig, state: Arc<CaptionState>) -> Result<Self> {
        Ok(Self {
            formatter: CaptionFormatter::with_state(config, state)?,
            bulk: BulkLineParser::new()?,
            links: LinkParser::new()?,
            sessions: SessionStore::new()?,
        })
    }

    /// Process-wide rotation and fixed-name state.
    pub fn state(&self) -> &Arc<CaptionState> {
        self.formatter.state()
    }

    pub fn formatter(&self) -> &CaptionFormatter {
        &self.formatter
    }

    /// Canonical caption for `text`; empty for blank input.
    pub fn format_caption(&self, text: &str, requester: RequesterId) -> String {
        self.formatter.format(text, requester)
    }

    pub fn extract_episode_info(&self, text: &str) -> EpisodeInfo {
        self.formatter.episodes.extract(text)
    }

    /// Caption spelling of the quality, `"720P"` when none is found.
    pub fn extract_quality(&self, text: &str) -> String {
        self.formatter.quality.normalize(text)
    }

    /// Language code, empty when none is recognized.
    pub fn extract_language(&self, text: &str) -> String {
        self.formatter.language.extract(text)
    }

    pub fn clean_name(&self, title: &str) -> String {
        self.formatter.names.clean(title)
    }

    pub fn looks_like_bulk(&self, text: &str) -> bool {
        self.bulk.looks_like_bulk(text)
    }

    pub fn parse_bulk_message(&self, text: &str) -> Vec<BulkEntry> {
        self.bulk.parse_message(text)
    }

    /// Parses a listing and hands every entry to `store`.
    pub fn store_bulk_message<S>(&self, store: &S, text: &str) -> StoreReport
    where
        S: EpisodeStore + ?Sized,
    {
        store_entries(store, &self.parse_bulk_message(text))
    }

    pub fn parse_link(&self, url_or_filename: &str) -> LinkInfo {
        self.links.parse(url_or_filename)
    }

    /// Links matching `filter`, ordered by episode.
    pub fn search_links<'a, I>(&self, links: I, filter: &SearchFilter) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.links.search(links, filter)
    }

    pub fn begin_session(&self, requester: RequesterId) -> BeginOutcome {
        self.sessions.begin(requester)
    }

    /// See [`SessionStore::ingest`].
    ///
    /// # Errors
    ///
    /// `NoActiveSession` without a prior [`begin_session`](Self::begin_session).
    pub fn ingest_file(
        &self,
        requester: RequesterId,
        file_id: &str,
        filename: Option<&str>,
        caption: &str,
        kind: FileKind,
    ) -> Result<FileMetadata> {
        self.sessions.ingest(requester, file_id, filename, caption, kind)
    }

    /// See [`SessionStore::end`].
    ///
    /// # Errors
    ///
    /// `NoActiveSession` or `EmptySession`.
    pub fn end_session(&self, requester: RequesterId) -> Result<(DeliveryPlan, SequenceSummary)> {
        self.sessions.end(requester)
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}
