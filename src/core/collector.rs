//! Pipeline driver: seeds → expansion → filter → manifest.
//!
//! Downloading is left to the caller so a dry run can stop after the
//! manifest is on disk.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::adapters::MetadataSource;
use crate::domain::{SeedList, VideoId};

use super::expander::expand_all;
use super::filter::{partition, DateBoundary, Partition};
use super::manifest::Manifest;

/// Inputs of one collection run
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Seed file
    pub seeds: PathBuf,

    /// Manifest output file (overwritten)
    pub output: PathBuf,

    /// Keep only videos published on/after this date
    pub after: Option<DateBoundary>,

    /// Maximum in-flight metadata requests (1 = sequential)
    pub concurrency: usize,
}

/// Everything a run produced, for reporting
#[derive(Debug, Clone)]
pub struct CollectReport {
    pub seeds: SeedList,
    pub expanded: BTreeSet<VideoId>,
    pub partition: Partition,
    pub manifest: Manifest,
}

/// Collection pipeline over a metadata source
pub struct Collector<S> {
    source: S,
}

impl<S: MetadataSource> Collector<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run the pipeline and write the manifest.
    ///
    /// Fails only on local problems (unreadable seed file, unwritable
    /// output). Remote failures are absorbed by the stage fallbacks.
    #[instrument(skip(self, options), fields(seeds = %options.seeds.display()))]
    pub async fn collect(&self, options: &CollectOptions) -> Result<CollectReport> {
        let seeds = SeedList::read(&options.seeds).await?;
        if seeds.is_empty() {
            warn!("Seed file contains no BV ids");
        }

        let report = self.collect_from(seeds, options).await;

        report
            .manifest
            .write(&options.output)
            .context("Failed to write URL manifest")?;
        info!(
            output = %options.output.display(),
            urls = report.manifest.len(),
            "Manifest written"
        );

        Ok(report)
    }

    /// Expand and filter already-parsed seeds without touching the filesystem
    pub async fn collect_from(&self, seeds: SeedList, options: &CollectOptions) -> CollectReport {
        let expanded = expand_all(&self.source, &seeds.ids, options.concurrency).await;
        info!(
            seeds = seeds.ids.len(),
            videos = expanded.len(),
            "Expanded seeds"
        );

        let partition = partition(
            &self.source,
            &expanded,
            options.after.as_ref(),
            options.concurrency,
        )
        .await;

        let manifest = Manifest::from_ids(partition.kept_ids());

        CollectReport {
            seeds,
            expanded,
            partition,
            manifest,
        }
    }
}
