use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::{info, warn};

use super::plan::{DeliveryPlan, SequenceSummary, Sequencer};
use crate::error::{CapsortError, Result};
use crate::parser::FileTagParser;
use crate::types::{FileKind, FileMetadata, RequesterId};

/// What [`SessionStore::begin`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeginOutcome {
    /// No session was open.
    Fresh,
    /// An open session was replaced; its files are dropped.
    Restarted { discarded: usize },
}

/// Per-requester file collection between a begin and an end signal.
///
/// Sessions of different requesters never see each other's files. A session
/// that is never ended just stays in the map until the store is dropped.
pub struct SessionStore {
    sessions: Mutex<HashMap<RequesterId, Vec<FileMetadata>>>,
    tags: FileTagParser,
}

impl SessionStore {
    /// # Errors
    ///
    /// Returns `CapsortError::RegexError` if a pattern fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            sessions: Mutex::new(HashMap::new()),
            tags: FileTagParser::new()?,
        })
    }

    /// Opens a session, replacing any open one for the same requester.
    pub fn begin(&self, requester: RequesterId) -> BeginOutcome {
        let previous = self.sessions.lock().insert(requester, Vec::new());
        match previous {
            Some(files) => {
                warn!(%requester, discarded = files.len(), "session restarted");
                BeginOutcome::Restarted {
                    discarded: files.len(),
                }
            }
            None => {
                info!(%requester, "session started");
                BeginOutcome::Fresh
            }
        }
    }

    /// Derives metadata for one file and appends it to the open session.
    ///
    /// A missing filename is replaced by the kind's default name. Files whose
    /// tags cannot be read are still collected; they end up in
    /// [`DeliveryPlan::invalid`].
    ///
    /// # Errors
    ///
    /// `NoActiveSession` if `begin` was not called for this requester.
    pub fn ingest(
        &self,
        requester: RequesterId,
        file_id: &str,
        filename: Option<&str>,
        caption: &str,
        kind: FileKind,
    ) -> Result<FileMetadata> {
        let filename = filename
            .filter(|name| !name.is_empty())
            .map_or_else(|| kind.default_filename(file_id), str::to_string);
        let meta = self.tags.ingest(file_id, filename, caption, kind);

        let mut sessions = self.sessions.lock();
        let Some(files) = sessions.get_mut(&requester) else {
            warn!(%requester, file_id, "file received outside a session");
            return Err(CapsortError::NoActiveSession { requester });
        };
        files.push(meta.clone());
        Ok(meta)
    }

    /// Closes the session and sequences its files. The session is cleared in
    /// every outcome.
    ///
    /// # Errors
    ///
    /// `NoActiveSession` without a prior `begin`, `EmptySession` when no file
    /// was ingested.
    pub fn end(&self, requester: RequesterId) -> Result<(DeliveryPlan, SequenceSummary)> {
        let files = self
            .sessions
            .lock()
            .remove(&requester)
            .ok_or(CapsortError::NoActiveSession { requester })?;
        if files.is_empty() {
            return Err(CapsortError::EmptySession { requester });
        }

        let plan = Sequencer::plan(files);
        let summary = plan.summary();
        info!(
            %requester,
            total = summary.total,
            sorted = summary.sorted,
            "session ended"
        );
        Ok((plan, summary))
    }

    #[must_use]
    pub fn is_active(&self, requester: RequesterId) -> bool {
        self.sessions.lock().contains_key(&requester)
    }

    /// Files collected so far, `None` without an open session.
    #[must_use]
    pub fn pending(&self, requester: RequesterId) -> Option<usize> {
        self.sessions.lock().get(&requester).map(Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::sequence::Bucket;

    const ME: RequesterId = RequesterId(7);

    fn store() -> SessionStore {
        SessionStore::new().unwrap()
    }

    fn tagged(episode: u32, quality: u32) -> String {
        format!("[S01-E{episode:02}] Show [{quality}P] [Single].mkv")
    }

    #[test]
    fn full_lifecycle() {
        let s = store();
        assert_eq!(s.begin(ME), BeginOutcome::Fresh);

        for (ep, q) in [(3, 480), (5, 720), (1, 480), (2, 480), (4, 720)] {
            let name = tagged(ep, q);
            s.ingest(ME, &format!("id{ep}"), Some(&name), "", FileKind::Document)
                .unwrap();
        }
        let junk = s
            .ingest(ME, "junk", Some("random.mkv"), "", FileKind::Document)
            .unwrap();
        assert!(!junk.is_deliverable());
        assert_eq!(s.pending(ME), Some(6));

        let (plan, summary) = s.end(ME).unwrap();
        let order: Vec<(Bucket, u32)> = plan
            .groups
            .iter()
            .flat_map(|g| g.files.iter().map(|f| (g.bucket, f.episode_number.unwrap())))
            .collect();
        assert_eq!(
            order,
            [
                (Bucket::Q480, 1),
                (Bucket::Q480, 2),
                (Bucket::Q480, 3),
                (Bucket::Q720, 4),
                (Bucket::Q720, 5),
            ]
        );
        assert_eq!(plan.invalid.len(), 1);
        assert_eq!(summary.failed(), 1);
        assert!(!s.is_active(ME));
    }

    #[test]
    fn ingest_without_begin() {
        let s = store();
        let err = s
            .ingest(ME, "id", Some("x.mkv"), "", FileKind::Video)
            .unwrap_err();
        assert!(matches!(err, CapsortError::NoActiveSession { requester } if requester == ME));
    }

    #[test]
    fn end_without_begin_and_empty_end() {
        let s = store();
        assert!(matches!(s.end(ME), Err(CapsortError::NoActiveSession { .. })));

        s.begin(ME);
        assert!(matches!(s.end(ME), Err(CapsortError::EmptySession { .. })));
        // The empty session is gone too.
        assert!(!s.is_active(ME));
    }

    #[test]
    fn begin_twice_discards_collected_files() {
        let s = store();
        s.begin(ME);
        s.ingest(ME, "a", Some(&tagged(1, 720)), "", FileKind::Document)
            .unwrap();
        assert_eq!(s.begin(ME), BeginOutcome::Restarted { discarded: 1 });
        assert_eq!(s.pending(ME), Some(0));
    }

    #[test]
    fn missing_filename_uses_default() {
        let s = store();
        s.begin(ME);
        let video = s
            .ingest(ME, "BAADBAADxyz", None, &tagged(2, 1080), FileKind::Video)
            .unwrap();
        assert_eq!(video.filename, "video_BAADBAAD.mp4");
        assert_eq!(video.episode_number, Some(2));

        let doc = s.ingest(ME, "d", Some(""), "", FileKind::Document).unwrap();
        assert_eq!(doc.filename, "unknown_document");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn sessions_are_isolated_per_requester() {
        let s = Arc::new(store());
        let mut handles = Vec::new();

        for user in 0..8_i64 {
            let s = Arc::clone(&s);
            handles.push(tokio::spawn(async move {
                let me = RequesterId(user);
                s.begin(me);
                for ep in (1..=10).rev() {
                    let name = tagged(ep, 720);
                    s.ingest(me, &format!("{user}-{ep}"), Some(&name), "", FileKind::Document)
                        .unwrap();
                    tokio::task::yield_now().await;
                }
                s.end(me).unwrap()
            }));
        }

        for (user, handle) in handles.into_iter().enumerate() {
            let (plan, summary) = handle.await.unwrap();
            assert_eq!(summary.total, 10);
            let prefix = format!("{user}-");
            assert!(plan.files().all(|f| f.file_id.starts_with(&prefix)));
            let episodes: Vec<u32> = plan.files().filter_map(|f| f.episode_number).collect();
            assert_eq!(episodes, (1..=10).collect::<Vec<_>>());
        }
    }
}
