//! bilicollect - Bilibili collection expander
//!
//! Turns a short list of seed videos into the full, deduplicated list of
//! video URLs of the collections ("合集") they belong to, optionally keeps
//! only recent uploads, and hands each URL to BBDown.
//!
//! # Pipeline
//!
//! ```text
//! seeds.txt → extract BV ids → expand collections → date filter → all_urls.txt → BBDown
//! ```
//!
//! Remote failures never abort a run: a seed whose metadata cannot be
//! fetched expands to itself, and a video whose publication date is
//! unknown is dropped by the date filter.
//!
//! # Modules
//!
//! - `adapters`: Metadata sources (Bilibili view API)
//! - `core`: Pipeline stages (Expander, Filter, Manifest, Downloader, Collector)
//! - `domain`: Data structures (VideoId, SeedList, view payloads)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Collect and download everything listed in seeds.txt
//! bilicollect run -- -ia
//!
//! # Only write the URL list for videos published since 2024
//! bilicollect run --after 2024-01-01 --dry-run
//!
//! # See what a single video expands to
//! bilicollect inspect https://www.bilibili.com/video/BV1xx411c7mD
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{BilibiliClient, MetadataSource, Unavailable};
pub use crate::core::{CollectOptions, CollectReport, Collector, DateBoundary, Downloader, Manifest};
pub use domain::{extract_video_id, SeedList, VideoId};
