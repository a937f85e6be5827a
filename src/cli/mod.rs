//! Command-line interface for bilicollect.
//!
//! Provides commands for collecting URLs from seed videos (and optionally
//! downloading them), previewing expansions, inspecting a single video's
//! metadata, and showing the resolved configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use crate::adapters::{BilibiliClient, MetadataSource};
use crate::config::{self, ResolvedConfig};
use crate::core::{
    expand_all, partition, CollectOptions, CollectReport, Collector, DateBoundary, Downloader,
    Manifest,
};
use crate::domain::extract_video_id;

pub mod inspect;

/// bilicollect - Expand Bilibili collections and download them via BBDown
#[derive(Parser, Debug)]
#[command(name = "bilicollect")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Expand seeds into a URL list and download every video
    Run {
        /// Seed file, one BV id or URL per line
        #[arg(long)]
        seeds: Option<PathBuf>,

        /// Output URL list file (overwritten)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only print and write URLs; do not call the downloader
        #[arg(long)]
        dry_run: bool,

        /// Do not call the downloader
        #[arg(long)]
        no_download: bool,

        /// Only keep videos published on/after this date (YYYY-MM-DD, UTC)
        #[arg(long, value_name = "YYYY-MM-DD")]
        after: Option<String>,

        /// Path to the BBDown executable (or use BILICOLLECT_BBDOWN env)
        #[arg(long)]
        bbdown: Option<PathBuf>,

        /// Maximum concurrent metadata requests
        #[arg(long)]
        concurrency: Option<usize>,

        /// Arguments passed to BBDown after the URL (everything after `--`)
        #[arg(last = true, value_name = "BBDOWN_ARGS")]
        bbdown_args: Vec<String>,
    },

    /// Print the expanded URL list for the given seeds without writing files
    Expand {
        /// BV ids or video URLs
        #[arg(required = true)]
        seeds: Vec<String>,

        /// Only keep videos published on/after this date (YYYY-MM-DD, UTC)
        #[arg(long, value_name = "YYYY-MM-DD")]
        after: Option<String>,
    },

    /// Show metadata and collection membership of one video
    Inspect {
        /// BV id or video URL
        video: String,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Run {
                seeds,
                output,
                dry_run,
                no_download,
                after,
                bbdown,
                concurrency,
                bbdown_args,
            } => {
                run_collect(RunArgs {
                    seeds,
                    output,
                    skip_download: dry_run || no_download,
                    after,
                    bbdown,
                    concurrency,
                    bbdown_args,
                })
                .await
            }
            Commands::Expand { seeds, after } => expand_seeds(&seeds, after.as_deref()).await,
            Commands::Inspect { video } => inspect::execute(&video).await,
            Commands::Config => show_config(),
        }
    }
}

/// Flags of the `run` command
#[derive(Debug, Default)]
struct RunArgs {
    seeds: Option<PathBuf>,
    output: Option<PathBuf>,
    skip_download: bool,
    after: Option<String>,
    bbdown: Option<PathBuf>,
    concurrency: Option<usize>,
    bbdown_args: Vec<String>,
}

/// Parse an optional `--after` value; a bad date is fatal
fn parse_after(after: Option<&str>) -> Result<Option<DateBoundary>> {
    after
        .map(|s| s.parse::<DateBoundary>())
        .transpose()
        .context("Invalid --after value")
}

/// Build the metadata client from configuration
fn build_client(cfg: &ResolvedConfig) -> Result<BilibiliClient> {
    BilibiliClient::with_settings(cfg.api.clone())
}

/// Format an epoch timestamp for diagnostics
fn format_epoch(epoch: Option<i64>) -> String {
    match epoch.and_then(|t| DateTime::<Utc>::from_timestamp(t, 0)) {
        Some(dt) => format!("{} ({})", dt.format("%Y-%m-%d %H:%M:%S UTC"), dt.timestamp()),
        None => "unknown".to_string(),
    }
}

/// Run the full pipeline
async fn run_collect(args: RunArgs) -> Result<()> {
    let cfg = config::config()?;

    let code = run_with(cfg, build_client(cfg)?, args).await?;
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}

/// Run the pipeline against any metadata source; returns the process exit code
async fn run_with<S: MetadataSource>(cfg: &ResolvedConfig, source: S, args: RunArgs) -> Result<i32> {
    // Configuration errors abort before any network activity
    let after = parse_after(args.after.as_deref())?;

    let options = CollectOptions {
        seeds: args.seeds.unwrap_or_else(|| cfg.seeds.clone()),
        output: args.output.unwrap_or_else(|| cfg.output.clone()),
        after,
        concurrency: args.concurrency.unwrap_or(cfg.concurrency).max(1),
    };

    let collector = Collector::new(source);
    let report = collector.collect(&options).await?;

    print_summary(&report, &options);

    if args.skip_download {
        print_dry_run(&report, &options, cfg.dropped_display_limit);
        return Ok(0);
    }

    let downloader_args = if args.bbdown_args.is_empty() {
        cfg.downloader_args.clone()
    } else {
        args.bbdown_args
    };
    let downloader = Downloader::new(
        args.bbdown.unwrap_or_else(|| cfg.downloader_path.clone()),
        downloader_args,
    );

    let summary = downloader.download_all(&report.manifest.urls()).await;

    if summary.success() {
        eprintln!("\n[OK] {} downloads completed", summary.outcomes.len());
    } else {
        eprintln!(
            "\n[FAIL] {} of {} downloads failed (exit code {})",
            summary.failed(),
            summary.outcomes.len(),
            summary.exit_code
        );
    }

    Ok(summary.exit_code)
}

/// Print the post-write status line
fn print_summary(report: &CollectReport, options: &CollectOptions) {
    if !report.seeds.skipped.is_empty() {
        eprintln!(
            "[WARN] skipped {} line(s) without a BV id:",
            report.seeds.skipped.len()
        );
        for line in &report.seeds.skipped {
            eprintln!("  line {}: {}", line.line_number, line.text);
        }
    }

    match &options.after {
        Some(boundary) => println!(
            "[OK] filter: pubdate >= {}, kept {}, dropped {}; written to {}",
            boundary,
            report.partition.kept.len(),
            report.partition.dropped.len(),
            options.output.display()
        ),
        None => println!(
            "[OK] collected {} unique video URLs, written to {}",
            report.manifest.len(),
            options.output.display()
        ),
    }
}

/// Print the URL listing and dropped diagnostics instead of downloading
fn print_dry_run(report: &CollectReport, options: &CollectOptions, dropped_limit: usize) {
    println!("\n[DRY-RUN] URLs that would be downloaded:\n");
    for url in report.manifest.urls() {
        println!("{}", url);
    }

    if options.after.is_some() && !report.partition.dropped.is_empty() {
        println!("\n[INFO] dropped by date filter or unknown publication date:");
        let (shown, hidden) = report.partition.dropped_preview(dropped_limit);
        for record in shown {
            println!("  {}  pubdate={}", record.id, format_epoch(record.published_at));
        }
        if hidden > 0 {
            println!("  ... {} more", hidden);
        }
    }

    println!("\n[DRY-RUN] downloader not invoked");
}

/// Expand seeds given on the command line and print the resulting URLs
async fn expand_seeds(seeds: &[String], after: Option<&str>) -> Result<()> {
    let cfg = config::config()?;
    let boundary = parse_after(after)?;

    let mut ids = Vec::new();
    for seed in seeds {
        match extract_video_id(seed) {
            Some(id) => ids.push(id),
            None => tracing::warn!(seed = seed.as_str(), "Skipping argument without a BV id"),
        }
    }

    if ids.is_empty() {
        anyhow::bail!("No BV ids found in the given arguments");
    }

    let client = build_client(cfg)?;
    let expanded = expand_all(&client, &ids, cfg.concurrency).await;
    let kept = partition(&client, &expanded, boundary.as_ref(), cfg.concurrency).await;

    for url in Manifest::from_ids(kept.kept_ids()).urls() {
        println!("{}", url);
    }

    if boundary.is_some() {
        eprintln!(
            "\n[{} kept, {} dropped by date]",
            kept.kept.len(),
            kept.dropped.len()
        );
    }

    Ok(())
}

/// Show the resolved configuration (for debugging)
fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("bilicollect configuration");
    println!("══════════════════════════════════════════════════════════════");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("API:");
    println!("  Base URL:     {}", cfg.api.base_url);
    println!("  Timeout:      {}s", cfg.api.timeout.as_secs());
    println!("  User-Agent:   {}", cfg.api.user_agent);
    println!("  Referer:      {}", cfg.api.referer);
    println!("  Concurrency:  {}", cfg.concurrency);
    println!();
    println!("Downloader:");
    println!("  Path:         {}", cfg.downloader_path.display());
    if cfg.downloader_args.is_empty() {
        println!("  Args:         (none)");
    } else {
        println!("  Args:         {}", cfg.downloader_args.join(" "));
    }
    println!();
    println!("Files:");
    println!("  Seeds:        {}", cfg.seeds.display());
    println!("  Output:       {}", cfg.output.display());
    println!("  Dropped list: first {}", cfg.dropped_display_limit);

    Ok(())
}
