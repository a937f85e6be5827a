//! Bilibili web API client.
//!
//! Calls `GET /x/web-interface/view?bvid=...` once per request. The API
//! rejects requests without a browser-like User-Agent and a bilibili.com
//! Referer, so both are always sent.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};

use super::{MetadataSource, Unavailable};
use crate::domain::{ApiEnvelope, VideoId, ViewData};

/// Default API host
pub const DEFAULT_API_BASE: &str = "https://api.bilibili.com";

/// View endpoint path
const VIEW_PATH: &str = "/x/web-interface/view";

/// Connection settings for the Bilibili client
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// API base URL without trailing slash
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,

    pub user_agent: String,

    pub referer: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(15),
            user_agent: "Mozilla/5.0".to_string(),
            referer: "https://www.bilibili.com/".to_string(),
        }
    }
}

/// Bilibili metadata client
pub struct BilibiliClient {
    /// HTTP client
    client: reqwest::Client,
    /// Base URL (tests point this at a mock server)
    base_url: String,
}

impl BilibiliClient {
    /// Create a client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(ClientSettings::default())
    }

    /// Create a client with custom settings
    pub fn with_settings(settings: ClientSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            REFERER,
            HeaderValue::from_str(&settings.referer)
                .with_context(|| format!("Invalid referer header: {}", settings.referer))?,
        );

        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build API URL
    fn view_url(&self) -> String {
        format!("{}{}", self.base_url, VIEW_PATH)
    }

    async fn fetch_view(&self, id: &VideoId) -> Result<ViewData, Unavailable> {
        let response = self
            .client
            .get(self.view_url())
            .query(&[("bvid", id.as_str())])
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Unavailable::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await.map_err(classify)?;
        let text = String::from_utf8_lossy(&body);

        let envelope: ApiEnvelope<ViewData> =
            serde_json::from_str(&text).map_err(|e| Unavailable::Malformed(e.to_string()))?;

        if envelope.code != 0 {
            return Err(Unavailable::Api {
                code: envelope.code,
                message: envelope.message,
            });
        }

        envelope.data.ok_or(Unavailable::MissingData)
    }
}

fn classify(err: reqwest::Error) -> Unavailable {
    if err.is_timeout() {
        Unavailable::Timeout
    } else {
        Unavailable::Request(err.to_string())
    }
}

#[async_trait]
impl MetadataSource for BilibiliClient {
    fn name(&self) -> &str {
        "bilibili"
    }

    async fn view(&self, id: &VideoId) -> Result<ViewData, Unavailable> {
        let result = self.fetch_view(id).await;
        if let Err(reason) = &result {
            tracing::debug!(%id, %reason, "View metadata unavailable");
        }
        result
    }
}
