//! Payload types of the Bilibili `x/web-interface/view` API.
//!
//! Only the fields the pipeline reads are modelled. Collection contents are
//! parsed leniently: `null` arrays are empty, and an entry of the wrong
//! shape is skipped on its own instead of failing the whole payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use super::video_id::VideoId;

/// Response envelope shared by Bilibili web APIs
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

/// Per-video metadata from the view endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewData {
    #[serde(default)]
    pub title: Option<String>,

    /// Publication time in epoch seconds (the API has sent both ints and floats)
    #[serde(default)]
    pub pubdate: Option<serde_json::Value>,

    /// Collection ("合集") this video belongs to, if any
    #[serde(default)]
    pub ugc_season: Option<UgcSeason>,
}

/// Collection descriptor
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UgcSeason {
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub sections: Vec<Section>,
}

/// Ordered group of episodes within a collection
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "lenient_entries")]
    pub episodes: Vec<Episode>,
}

/// Single collection entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Episode {
    #[serde(default, deserialize_with = "string_or_none")]
    pub bvid: Option<String>,

    #[serde(default, deserialize_with = "integer_or_none")]
    pub aid: Option<i64>,

    #[serde(default, deserialize_with = "string_or_none")]
    pub title: Option<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Like `null_as_empty`, but elements that don't decode as `T` are dropped
fn lenient_entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw: Vec<serde_json::Value> = null_as_empty(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect())
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

fn integer_or_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(serde_json::Value::deserialize(deserializer)?.as_i64())
}

impl ViewData {
    /// Publication epoch seconds, if the field is numeric
    pub fn publication_epoch(&self) -> Option<i64> {
        let value = self.pubdate.as_ref()?;
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f as i64))
    }
}

impl UgcSeason {
    /// All well-formed episode ids across every section, in collection order.
    ///
    /// Entries whose `bvid` is missing or fails validation are dropped.
    pub fn episode_ids(&self) -> Vec<VideoId> {
        self.sections
            .iter()
            .flat_map(|section| section.episodes.iter())
            .filter_map(|episode| episode.bvid.as_deref())
            .filter_map(|bvid| VideoId::parse(bvid).ok())
            .collect()
    }

    /// Total number of episode entries, valid or not
    pub fn episode_count(&self) -> usize {
        self.sections.iter().map(|s| s.episodes.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_view_with_collection() {
        let json = r#"{
            "code": 0,
            "message": "0",
            "data": {
                "title": "Episode 3",
                "pubdate": 1704067200,
                "ugc_season": {
                    "id": 42,
                    "title": "Rust in Depth",
                    "sections": [
                        {"title": "Part 1", "episodes": [
                            {"bvid": "BV1epiAAAAA1", "aid": 1, "title": "One"},
                            {"bvid": "BV1epiAAAAA2", "aid": 2, "title": "Two"}
                        ]},
                        {"title": "Part 2", "episodes": [
                            {"bvid": "garbage", "aid": 3},
                            {"aid": 4},
                            {"bvid": "BV1epiAAAAA3"}
                        ]}
                    ]
                }
            }
        }"#;

        let envelope: ApiEnvelope<ViewData> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.code, 0);

        let data = envelope.data.unwrap();
        assert_eq!(data.publication_epoch(), Some(1_704_067_200));

        let season = data.ugc_season.unwrap();
        assert_eq!(season.episode_count(), 5);
        let ids: Vec<String> = season.episode_ids().into_iter().map(String::from).collect();
        assert_eq!(ids, vec!["BV1epiAAAAA1", "BV1epiAAAAA2", "BV1epiAAAAA3"]);
    }

    #[test]
    fn test_parse_error_envelope() {
        let json = r#"{"code": -404, "message": "啥都木有", "ttl": 1}"#;
        let envelope: ApiEnvelope<ViewData> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.code, -404);
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_null_sections_are_empty() {
        let json = r#"{"ugc_season": {"title": "empty", "sections": null}}"#;
        let data: ViewData = serde_json::from_str(json).unwrap();
        let season = data.ugc_season.unwrap();
        assert!(season.sections.is_empty());
        assert!(season.episode_ids().is_empty());
    }

    #[test]
    fn test_mistyped_episodes_are_skipped_individually() {
        let json = r#"{
            "pubdate": 1710000000,
            "ugc_season": {"sections": [{"episodes": [
                {"bvid": "BV1aaaaaaaaa"},
                {"bvid": 12345},
                null,
                "BV1zzzzzzzzz",
                {"bvid": "BV1bbbbbbbbb", "aid": "not-a-number"},
                {"bvid": "BV1ccccccccc", "aid": 3}
            ]}]}
        }"#;

        let data: ViewData = serde_json::from_str(json).unwrap();
        assert_eq!(data.publication_epoch(), Some(1_710_000_000));

        let season = data.ugc_season.unwrap();
        // Non-object entries are gone; a mistyped field only blanks that field
        assert_eq!(season.episode_count(), 4);
        let ids: Vec<String> = season.episode_ids().into_iter().map(String::from).collect();
        assert_eq!(ids, vec!["BV1aaaaaaaaa", "BV1bbbbbbbbb", "BV1ccccccccc"]);
        assert_eq!(season.sections[0].episodes[2].aid, None);
    }

    #[test]
    fn test_float_and_string_pubdate() {
        let data: ViewData = serde_json::from_str(r#"{"pubdate": 1704067200.5}"#).unwrap();
        assert_eq!(data.publication_epoch(), Some(1_704_067_200));

        let data: ViewData = serde_json::from_str(r#"{"pubdate": "1704067200"}"#).unwrap();
        assert_eq!(data.publication_epoch(), None);

        let data: ViewData = serde_json::from_str("{}").unwrap();
        assert_eq!(data.publication_epoch(), None);
    }
}
