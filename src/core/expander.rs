//! Collection expansion.
//!
//! A seed video expands to every video of the collection it belongs to.
//! Anything short of a usable collection degrades to the seed alone, so
//! an expansion is never empty.

use std::collections::BTreeSet;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument};

use crate::adapters::{MetadataSource, Unavailable};
use crate::domain::VideoId;

/// How an expansion was resolved
#[derive(Debug, Clone)]
pub enum ExpansionOrigin {
    /// The seed belongs to a collection with usable episodes
    Collection {
        title: Option<String>,
        episodes: usize,
    },

    /// Metadata had no collection descriptor
    NotACollection,

    /// A collection descriptor was present but yielded no valid ids
    EmptyCollection,

    /// Metadata could not be fetched
    Unavailable(Unavailable),
}

/// Result of expanding one seed
#[derive(Debug, Clone)]
pub struct Expansion {
    pub seed: VideoId,
    /// Never empty
    pub members: BTreeSet<VideoId>,
    pub origin: ExpansionOrigin,
}

impl Expansion {
    fn singleton(seed: &VideoId, origin: ExpansionOrigin) -> Self {
        Self {
            seed: seed.clone(),
            members: BTreeSet::from([seed.clone()]),
            origin,
        }
    }
}

/// Expand one seed into the ids of its collection
#[instrument(skip(source), fields(source = source.name()))]
pub async fn expand_seed<S>(source: &S, seed: &VideoId) -> Expansion
where
    S: MetadataSource + ?Sized,
{
    let data = match source.view(seed).await {
        Ok(data) => data,
        Err(reason) => {
            debug!(%reason, "Falling back to the seed alone");
            return Expansion::singleton(seed, ExpansionOrigin::Unavailable(reason));
        }
    };

    let Some(season) = data.ugc_season else {
        debug!("Not part of a collection");
        return Expansion::singleton(seed, ExpansionOrigin::NotACollection);
    };

    let members: BTreeSet<VideoId> = season.episode_ids().into_iter().collect();
    if members.is_empty() {
        debug!("Collection has no valid episodes, using the seed alone");
        return Expansion::singleton(seed, ExpansionOrigin::EmptyCollection);
    }

    info!(
        collection = season.title.as_deref().unwrap_or(""),
        episodes = members.len(),
        "Expanded collection"
    );

    Expansion {
        seed: seed.clone(),
        origin: ExpansionOrigin::Collection {
            title: season.title,
            episodes: members.len(),
        },
        members,
    }
}

/// Expand every seed and return the union of all expansions.
///
/// `concurrency` bounds in-flight metadata requests; 1 means strictly
/// sequential. Results are merged in seed order either way.
pub async fn expand_all<S>(source: &S, seeds: &[VideoId], concurrency: usize) -> BTreeSet<VideoId>
where
    S: MetadataSource + ?Sized,
{
    let expansions: Vec<Expansion> = stream::iter(seeds)
        .map(|seed| expand_seed(source, seed))
        .buffered(concurrency.max(1))
        .collect()
        .await;

    expansions
        .into_iter()
        .flat_map(|expansion| expansion.members)
        .collect()
}
