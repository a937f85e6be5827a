//! External downloader invocation (BBDown).
//!
//! Each URL is handed to the downloader as `<program> <url> <args...>`,
//! one process at a time, with stdout/stderr passed through live.

use std::path::PathBuf;

use tokio::process::Command;
use tracing::{error, info, warn};

/// Exit code recorded when the downloader cannot be started
pub const SPAWN_FAILURE_CODE: i32 = 127;

/// Downloader executable and pass-through arguments
#[derive(Debug, Clone)]
pub struct Downloader {
    program: PathBuf,
    args: Vec<String>,
}

/// Result of one downloader process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub url: String,
    /// 0 on success
    pub exit_code: i32,
}

/// Aggregate of a download run
#[derive(Debug, Clone, Default)]
pub struct DownloadSummary {
    pub outcomes: Vec<DownloadOutcome>,
    /// First non-zero exit code observed, or 0
    pub exit_code: i32,
}

impl DownloadSummary {
    fn record(&mut self, outcome: DownloadOutcome) {
        if self.exit_code == 0 && outcome.exit_code != 0 {
            self.exit_code = outcome.exit_code;
        }
        self.outcomes.push(outcome);
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.exit_code != 0).count()
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

impl Downloader {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Human-readable command line for one URL
    pub fn command_line(&self, url: &str) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(std::iter::once(url.to_string()))
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the downloader once for a single URL
    pub async fn download(&self, url: &str) -> DownloadOutcome {
        println!(">> {}", self.command_line(url));

        let status = Command::new(&self.program)
            .arg(url)
            .args(&self.args)
            .status()
            .await;

        let exit_code = match status {
            Ok(status) if status.success() => 0,
            Ok(status) => {
                // None when terminated by a signal
                let code = status.code().unwrap_or(1);
                warn!(url, code, "Downloader exited with failure");
                code
            }
            Err(e) => {
                error!(url, program = %self.program.display(), error = %e, "Failed to start downloader");
                SPAWN_FAILURE_CODE
            }
        };

        DownloadOutcome {
            url: url.to_string(),
            exit_code,
        }
    }

    /// Download every URL in order, waiting for each process to finish.
    ///
    /// Failures do not stop the loop; the first failing exit code is kept.
    pub async fn download_all(&self, urls: &[String]) -> DownloadSummary {
        let mut summary = DownloadSummary::default();

        for url in urls {
            let outcome = self.download(url).await;
            summary.record(outcome);
        }

        info!(
            total = summary.outcomes.len(),
            failed = summary.failed(),
            "Downloads finished"
        );

        summary
    }
}
