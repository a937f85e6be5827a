//! URL manifest output.
//!
//! The manifest is rebuilt from scratch every run: sorted, deduplicated,
//! one canonical URL per line.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::VideoId;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to write manifest {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Sorted, unique list of videos to download
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    ids: Vec<VideoId>,
}

impl Manifest {
    /// Build from any collection of ids; order and duplicates do not matter
    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = VideoId>,
    {
        let unique: BTreeSet<VideoId> = ids.into_iter().collect();
        Self {
            ids: unique.into_iter().collect(),
        }
    }

    pub fn ids(&self) -> &[VideoId] {
        &self.ids
    }

    /// Canonical URLs in manifest order
    pub fn urls(&self) -> Vec<String> {
        self.ids.iter().map(VideoId::url).collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// File contents: newline-joined URLs, trailing newline iff non-empty
    pub fn render(&self) -> String {
        let mut out = self.urls().join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }

    /// Replace `path` with the rendered manifest.
    ///
    /// Writes a temporary file next to the target and renames it into place.
    /// An existing target keeps its permissions; a new one gets the usual
    /// umask-filtered `0o666`.
    pub fn write(&self, path: &Path) -> Result<(), ManifestError> {
        let wrap = |source: std::io::Error| ManifestError::Write {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(wrap)?;

        let mut temp = temp_builder().tempfile_in(dir).map_err(wrap)?;
        temp.write_all(self.render().as_bytes()).map_err(wrap)?;
        temp.flush().map_err(wrap)?;
        if let Ok(existing) = std::fs::metadata(path) {
            temp.as_file()
                .set_permissions(existing.permissions())
                .map_err(wrap)?;
        }
        temp.persist(path).map_err(|e| wrap(e.error))?;

        Ok(())
    }
}

#[cfg(unix)]
fn temp_builder() -> tempfile::Builder<'static, 'static> {
    use std::os::unix::fs::PermissionsExt;

    let mut builder = tempfile::Builder::new();
    builder.permissions(std::fs::Permissions::from_mode(0o666));
    builder
}

#[cfg(not(unix))]
fn temp_builder() -> tempfile::Builder<'static, 'static> {
    tempfile::Builder::new()
}
