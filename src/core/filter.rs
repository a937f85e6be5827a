//! Publication-date filtering.
//!
//! Filtering is opt-in: it costs one metadata request per video. A video
//! whose publication date cannot be determined is dropped.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{info, instrument};

use crate::adapters::{publication_epoch, MetadataSource};
use crate::domain::VideoId;

/// Date format accepted for boundaries
pub const BOUNDARY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid date {input:?}: expected YYYY-MM-DD")]
pub struct BoundaryError {
    pub input: String,
}

/// Inclusive lower bound on publication time: midnight UTC of a calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBoundary {
    date: NaiveDate,
    epoch: i64,
}

impl DateBoundary {
    pub fn new(date: NaiveDate) -> Self {
        let epoch = date.and_time(NaiveTime::MIN).and_utc().timestamp();
        Self { date, epoch }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Boundary in epoch seconds
    pub fn epoch(&self) -> i64 {
        self.epoch
    }

    /// Whether a publication time is on or after the boundary
    pub fn admits(&self, published_at: i64) -> bool {
        published_at >= self.epoch
    }
}

impl FromStr for DateBoundary {
    type Err = BoundaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), BOUNDARY_FORMAT)
            .map(Self::new)
            .map_err(|_| BoundaryError {
                input: s.to_string(),
            })
    }
}

impl fmt::Display for DateBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format(BOUNDARY_FORMAT))
    }
}

/// A video paired with its publication time, when known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationRecord {
    pub id: VideoId,
    pub published_at: Option<i64>,
}

/// Outcome of filtering
#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub kept: Vec<PublicationRecord>,
    /// Diagnostics only
    pub dropped: Vec<PublicationRecord>,
}

impl Partition {
    /// Ids that survived filtering
    pub fn kept_ids(&self) -> BTreeSet<VideoId> {
        self.kept.iter().map(|r| r.id.clone()).collect()
    }

    /// Dropped records for display, capped at `limit`, plus how many were hidden
    pub fn dropped_preview(&self, limit: usize) -> (&[PublicationRecord], usize) {
        let shown = self.dropped.len().min(limit);
        (&self.dropped[..shown], self.dropped.len() - shown)
    }
}

/// Split `ids` into kept and dropped against an optional boundary.
///
/// Without a boundary everything is kept and no request is made.
#[instrument(skip_all, fields(count = ids.len(), boundary = ?boundary.map(|b| b.to_string())))]
pub async fn partition<S>(
    source: &S,
    ids: &BTreeSet<VideoId>,
    boundary: Option<&DateBoundary>,
    concurrency: usize,
) -> Partition
where
    S: MetadataSource + ?Sized,
{
    let Some(boundary) = boundary else {
        return Partition {
            kept: ids
                .iter()
                .map(|id| PublicationRecord {
                    id: id.clone(),
                    published_at: None,
                })
                .collect(),
            dropped: Vec::new(),
        };
    };

    let records: Vec<PublicationRecord> = stream::iter(ids)
        .map(|id| async move {
            PublicationRecord {
                id: id.clone(),
                published_at: publication_epoch(source, id).await,
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let (kept, dropped): (Vec<_>, Vec<_>) = records
        .into_iter()
        .partition(|r| r.published_at.is_some_and(|t| boundary.admits(t)));

    info!(kept = kept.len(), dropped = dropped.len(), "Filtered by publication date");

    Partition { kept, dropped }
}
