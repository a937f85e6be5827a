//! Domain types for bilicollect.
//!
//! This module contains the core data structures:
//! - VideoId: Validated BV identifiers and extraction from free text
//! - Seeds: Seed file parsing
//! - Metadata: View API payloads (collections, publication dates)

pub mod metadata;
pub mod seeds;
pub mod video_id;

// Re-export commonly used types
pub use metadata::{ApiEnvelope, Episode, Section, UgcSeason, ViewData};
pub use seeds::{SeedError, SeedList, SkippedLine};
pub use video_id::{extract_video_id, InvalidVideoId, VideoId, VIDEO_URL_PREFIX};
