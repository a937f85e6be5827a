//! `bilicollect inspect` - show what the view API reports for one video.
//!
//! Useful for checking why a seed did or did not expand into a collection.

use anyhow::{Context, Result};

use crate::adapters::MetadataSource;
use crate::config;
use crate::domain::{extract_video_id, VideoId, ViewData};

use super::{build_client, format_epoch};

/// Execute the inspect command
pub async fn execute(video: &str) -> Result<()> {
    let id = extract_video_id(video)
        .with_context(|| format!("No BV id found in {:?}", video))?;

    let cfg = config::config()?;
    let client = build_client(cfg)?;

    let data = client
        .view(&id)
        .await
        .with_context(|| format!("Metadata unavailable for {}", id))?;

    print!("{}", render(&id, &data));
    Ok(())
}

/// Render view metadata as a human-readable report
fn render(id: &VideoId, data: &ViewData) -> String {
    let mut out = String::new();

    out.push_str(&format!("Video:     {}\n", id));
    out.push_str(&format!("URL:       {}\n", id.url()));
    if let Some(title) = &data.title {
        out.push_str(&format!("Title:     {}\n", title));
    }
    out.push_str(&format!("Published: {}\n", format_epoch(data.publication_epoch())));

    let Some(season) = &data.ugc_season else {
        out.push_str("\nNot part of a collection\n");
        return out;
    };

    let valid = season.episode_ids();
    out.push_str(&format!(
        "\nCollection: {}",
        season.title.as_deref().unwrap_or("(untitled)")
    ));
    if let Some(season_id) = season.id {
        out.push_str(&format!(" [{}]", season_id));
    }
    out.push_str(&format!(
        "\n  {} section(s), {} episode(s), {} usable\n",
        season.sections.len(),
        season.episode_count(),
        valid.len()
    ));

    for section in &season.sections {
        out.push_str(&format!(
            "\n  {}\n",
            section.title.as_deref().unwrap_or("(section)")
        ));
        for episode in &section.episodes {
            let bvid = episode.bvid.as_deref().unwrap_or("-");
            let marker = if VideoId::parse(bvid).is_ok() { " " } else { "!" };
            out.push_str(&format!(
                "   {}{}  {}\n",
                marker,
                bvid,
                episode.title.as_deref().unwrap_or("")
            ));
        }
    }

    if valid.is_empty() {
        out.push_str("\nNo usable episodes: the seed would be collected alone\n");
    }

    out
}
