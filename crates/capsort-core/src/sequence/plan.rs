//! # Delivery planning
//!
//! Partitions a collected batch into quality buckets, orders each bucket by
//! episode and renders the end-of-batch summary.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{FileMetadata, Quality};

/// Fixed delivery partitions, in delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Bucket {
    Q480,
    Q720,
    Q1080,
    /// Any recognized quality outside the three fixed ones.
    Other,
}

impl Bucket {
    /// Delivery order across buckets.
    pub const ORDER: [Bucket; 4] = [Self::Q480, Self::Q720, Self::Q1080, Self::Other];

    #[must_use]
    pub fn for_quality(quality: Quality) -> Self {
        match quality {
            Quality::SD480 => Self::Q480,
            Quality::HD720 => Self::Q720,
            Quality::FHD1080 => Self::Q1080,
            _ => Self::Other,
        }
    }

    /// The quality a fixed bucket holds; `None` for [`Bucket::Other`].
    #[must_use]
    pub fn quality(self) -> Option<Quality> {
        match self {
            Self::Q480 => Some(Quality::SD480),
            Self::Q720 => Some(Quality::HD720),
            Self::Q1080 => Some(Quality::FHD1080),
            Self::Other => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Q480 => 0,
            Self::Q720 => 1,
            Self::Q1080 => 2,
            Self::Other => 3,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quality() {
            Some(q) => write!(f, "{q}"),
            None => write!(f, "Other"),
        }
    }
}

/// One non-empty bucket, files in delivery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryGroup {
    pub bucket: Bucket,
    pub files: Vec<FileMetadata>,
}

impl DeliveryGroup {
    /// Announcement sent before the group's files.
    #[must_use]
    pub fn header(&self) -> String {
        let label = match self.bucket.quality() {
            Some(q) => q.caption_label(),
            None => "OTHER".to_string(),
        };
        format!(
            "{label} QUALITY EPISODES - Sending {} episodes",
            self.files.len()
        )
    }

    /// Lowest and highest episode number in the group.
    #[must_use]
    pub fn episode_range(&self) -> Option<(u32, u32)> {
        let mut numbers = self.files.iter().filter_map(|f| f.episode_number);
        let first = numbers.next()?;
        Some(numbers.fold((first, first), |(lo, hi), n| (lo.min(n), hi.max(n))))
    }
}

/// Ordered output of a sequencing session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryPlan {
    /// Non-empty groups in bucket order.
    pub groups: Vec<DeliveryGroup>,
    /// Files lacking an episode number or a quality. Never delivered.
    pub invalid: Vec<FileMetadata>,
}

impl DeliveryPlan {
    /// Returns `true` if nothing is deliverable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Files in delivery order across all groups.
    pub fn files(&self) -> impl Iterator<Item = &FileMetadata> {
        self.groups.iter().flat_map(|g| g.files.iter())
    }

    /// Number of deliverable files.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.groups.iter().map(|g| g.files.len()).sum()
    }

    #[must_use]
    pub fn summary(&self) -> SequenceSummary {
        let sorted = self.delivered();
        SequenceSummary {
            total: sorted + self.invalid.len(),
            sorted,
            buckets: self
                .groups
                .iter()
                .map(|g| BucketSummary {
                    bucket: g.bucket,
                    count: g.files.len(),
                    range: g.episode_range(),
                })
                .collect(),
        }
    }
}

/// Per-bucket line of a [`SequenceSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSummary {
    pub bucket: Bucket,
    pub count: usize,
    pub range: Option<(u32, u32)>,
}

/// Counts reported once a session has been sequenced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceSummary {
    pub total: usize,
    pub sorted: usize,
    pub buckets: Vec<BucketSummary>,
}

impl SequenceSummary {
    #[must_use]
    pub fn failed(&self) -> usize {
        self.total - self.sorted
    }
}

impl fmt::Display for SequenceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SORTING COMPLETE")?;
        writeln!(f, "{}/{} files sorted", self.sorted, self.total)?;
        writeln!(f)?;
        for line in &self.buckets {
            let range = match line.range {
                Some((lo, hi)) => format!("E{lo:02}-E{hi:02}"),
                None => "None".to_string(),
            };
            writeln!(f, "{}: {} episodes ({range})", line.bucket, line.count)?;
        }
        if self.failed() > 0 {
            write!(f, "\n{} files failed processing", self.failed())?;
        }
        write!(f, "\n\nFiles sent in order: 480p -> 720p -> 1080p")
    }
}

/// Groups and orders a collected batch.
pub struct Sequencer;

impl Sequencer {
    /// Builds the delivery plan. Arrival order breaks every tie.
    #[must_use]
    pub fn plan(files: Vec<FileMetadata>) -> DeliveryPlan {
        let mut buckets: [Vec<FileMetadata>; 4] = Default::default();
        let mut invalid = Vec::new();

        for file in files {
            match (file.episode_number, file.video_quality) {
                (Some(_), Some(quality)) => buckets[Bucket::for_quality(quality).index()].push(file),
                _ => invalid.push(file),
            }
        }

        let groups = Bucket::ORDER
            .into_iter()
            .zip(buckets)
            .filter(|(_, files)| !files.is_empty())
            .map(|(bucket, mut files)| {
                if bucket == Bucket::Other {
                    files.sort_by_key(|f| (f.episode_number, f.video_quality.map_or(0, Quality::lines)));
                } else {
                    files.sort_by_key(|f| f.episode_number);
                }
                DeliveryGroup { bucket, files }
            })
            .collect();

        DeliveryPlan { groups, invalid }
    }
}
