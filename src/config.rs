//! Configuration for bilicollect.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags (applied by the CLI)
//! 2. Environment variables (BILICOLLECT_BBDOWN, BILICOLLECT_API_BASE)
//! 3. Config file (.bilicollect/config.yaml)
//! 4. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .bilicollect/config.yaml
//! - Paths in config file are relative to the project root (the parent of .bilicollect/)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::ClientSettings;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Config directory name
pub const CONFIG_DIR: &str = ".bilicollect";

/// Environment variable overriding the downloader path
pub const ENV_BBDOWN: &str = "BILICOLLECT_BBDOWN";

/// Environment variable overriding the API base URL
pub const ENV_API_BASE: &str = "BILICOLLECT_API_BASE";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub api: Option<ApiConfig>,
    #[serde(default)]
    pub downloader: Option<DownloaderConfig>,
    #[serde(default)]
    pub files: Option<FilesConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    /// Maximum in-flight metadata requests
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloaderConfig {
    /// Path to the BBDown executable (relative to project root)
    pub path: Option<String>,
    /// Arguments passed to every invocation
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilesConfig {
    pub seeds: Option<String>,
    pub output: Option<String>,
    pub dropped_display_limit: Option<usize>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Metadata API settings
    pub api: ClientSettings,
    /// Maximum in-flight metadata requests
    pub concurrency: usize,
    /// Downloader executable
    pub downloader_path: PathBuf,
    /// Default downloader arguments
    pub downloader_args: Vec<String>,
    /// Default seed file
    pub seeds: PathBuf,
    /// Default manifest file
    pub output: PathBuf,
    /// How many dropped videos to list in dry-run output
    pub dropped_display_limit: usize,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            api: ClientSettings::default(),
            concurrency: 1,
            downloader_path: PathBuf::from("./BBDown"),
            downloader_args: Vec::new(),
            seeds: PathBuf::from("seeds.txt"),
            output: PathBuf::from("all_urls.txt"),
            dropped_display_limit: 30,
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(CONFIG_DIR).join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Merge a parsed config file and environment lookups over the defaults
fn resolve(
    file: Option<(PathBuf, ConfigFile)>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    let mut resolved = ResolvedConfig::default();

    if let Some((config_path, config)) = file {
        // Base directory is the parent of .bilicollect/
        let base_dir = config_path
            .parent()
            .and_then(|p| p.parent())
            .unwrap_or(Path::new("."))
            .to_path_buf();

        if let Some(api) = config.api {
            if let Some(base_url) = api.base_url {
                resolved.api.base_url = base_url;
            }
            if let Some(secs) = api.timeout_seconds {
                resolved.api.timeout = Duration::from_secs(secs);
            }
            if let Some(user_agent) = api.user_agent {
                resolved.api.user_agent = user_agent;
            }
            if let Some(referer) = api.referer {
                resolved.api.referer = referer;
            }
            if let Some(concurrency) = api.concurrency {
                resolved.concurrency = concurrency.max(1);
            }
        }

        if let Some(downloader) = config.downloader {
            if let Some(path) = downloader.path {
                resolved.downloader_path = resolve_path(&base_dir, &path);
            }
            resolved.downloader_args = downloader.args;
        }

        if let Some(files) = config.files {
            if let Some(seeds) = files.seeds {
                resolved.seeds = resolve_path(&base_dir, &seeds);
            }
            if let Some(output) = files.output {
                resolved.output = resolve_path(&base_dir, &output);
            }
            if let Some(limit) = files.dropped_display_limit {
                resolved.dropped_display_limit = limit;
            }
        }

        resolved.config_file = Some(config_path);
    }

    if let Some(path) = env(ENV_BBDOWN) {
        resolved.downloader_path = PathBuf::from(path);
    }
    if let Some(base_url) = env(ENV_API_BASE) {
        resolved.api.base_url = base_url;
    }

    resolved
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let file = match find_config_file() {
        Some(path) => {
            let config = load_config_file(&path)?;
            Some((path, config))
        }
        None => None,
    };

    Ok(resolve(file, |key| std::env::var(key).ok()))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
