//! Seed file parsing.
//!
//! One entry per line. Blank lines and `#` comments are ignored; every
//! other line must contain a BV id somewhere or it is skipped.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use super::video_id::{extract_video_id, VideoId};

/// Errors reading the seed file
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Seed file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A line that carried content but no recognizable BV id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the seed file
    pub line_number: usize,
    /// Trimmed line text
    pub text: String,
}

/// Parsed seed file
#[derive(Debug, Clone, Default)]
pub struct SeedList {
    /// Extracted ids in file order (may repeat)
    pub ids: Vec<VideoId>,
    /// Lines that were skipped because no id could be extracted
    pub skipped: Vec<SkippedLine>,
}

impl SeedList {
    /// Parse seed text, logging a warning for every unrecognized line
    pub fn parse(content: &str) -> Self {
        let mut list = SeedList::default();

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match extract_video_id(line) {
                Some(id) => list.ids.push(id),
                None => {
                    warn!(line = index + 1, text = line, "Skipping line without a BV id");
                    list.skipped.push(SkippedLine {
                        line_number: index + 1,
                        text: line.to_string(),
                    });
                }
            }
        }

        list
    }

    /// Read and parse a seed file
    pub async fn read(path: &Path) -> Result<Self, SeedError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SeedError::NotFound(path.to_path_buf())
            } else {
                SeedError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        Ok(Self::parse(&content))
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
