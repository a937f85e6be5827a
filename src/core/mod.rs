//! Core pipeline logic.
//!
//! This module contains:
//! - Expander: Seed → collection members
//! - Filter: Publication-date partitioning
//! - Manifest: Sorted URL list output
//! - Downloader: Sequential BBDown invocation
//! - Collector: Pipeline driver tying the stages together

pub mod collector;
pub mod downloader;
pub mod expander;
pub mod filter;
pub mod manifest;

// Re-export commonly used types
pub use collector::{CollectOptions, CollectReport, Collector};
pub use downloader::{DownloadOutcome, DownloadSummary, Downloader, SPAWN_FAILURE_CODE};
pub use expander::{expand_all, expand_seed, Expansion, ExpansionOrigin};
pub use filter::{partition, BoundaryError, DateBoundary, Partition, PublicationRecord};
pub use manifest::{Manifest, ManifestError};
