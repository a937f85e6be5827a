//! Adapter interfaces for external systems.
//!
//! The pipeline only ever talks to the remote API through
//! [`MetadataSource`], so tests can substitute canned responses.

pub mod bilibili;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{VideoId, ViewData};

// Re-export the Bilibili adapter
pub use bilibili::{BilibiliClient, ClientSettings};

/// Why metadata for a video could not be obtained.
///
/// This is a soft failure: every caller maps it to a fallback value.
#[derive(Debug, Clone, Error)]
pub enum Unavailable {
    #[error("request failed: {0}")]
    Request(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("response carried no data")]
    MissingData,
}

/// Trait for video metadata providers
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Human-readable source name
    fn name(&self) -> &str;

    /// Fetch view metadata for one video (single attempt)
    async fn view(&self, id: &VideoId) -> Result<ViewData, Unavailable>;
}

/// Publication epoch of a video, or `None` when unobtainable
pub async fn publication_epoch<S>(source: &S, id: &VideoId) -> Option<i64>
where
    S: MetadataSource + ?Sized,
{
    match source.view(id).await {
        Ok(data) => data.publication_epoch(),
        Err(reason) => {
            tracing::debug!(%id, %reason, "Publication date unavailable");
            None
        }
    }
}
