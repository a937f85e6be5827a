//! Bilibili video identifiers (BV ids).
//!
//! A BV id is `BV` followed by exactly ten ASCII alphanumerics. Ids are
//! only ever constructed through validation or extraction, so holding a
//! `VideoId` means the string matched the pattern.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical page URL prefix for a video
pub const VIDEO_URL_PREFIX: &str = "https://www.bilibili.com/video/";

/// Unanchored pattern used to find an id inside free text
static BV_SEARCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"BV[0-9A-Za-z]{10}").expect("valid regex"));

/// Anchored pattern used to validate a whole string
static BV_EXACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^BV[0-9A-Za-z]{10}$").expect("valid regex"));

/// Error returned when a string is not a well-formed BV id
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid BV id: {0:?}")]
pub struct InvalidVideoId(pub String);

/// A validated BV id
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VideoId(String);

impl VideoId {
    /// Validate a complete string as a BV id
    pub fn parse(s: &str) -> Result<Self, InvalidVideoId> {
        if BV_EXACT.is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidVideoId(s.to_string()))
        }
    }

    /// Get the raw string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical video page URL
    pub fn url(&self) -> String {
        format!("{}{}", VIDEO_URL_PREFIX, self.0)
    }
}

/// Find the first BV id anywhere in `text` (a URL, a bare id, a sentence).
///
/// Returns `None` when nothing matches; callers decide whether that is
/// worth a warning.
pub fn extract_video_id(text: &str) -> Option<VideoId> {
    BV_SEARCH
        .find(text)
        .map(|m| VideoId(m.as_str().to_string()))
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VideoId {
    type Err = InvalidVideoId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VideoId {
    type Error = InvalidVideoId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VideoId> for String {
    fn from(id: VideoId) -> Self {
        id.0
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
