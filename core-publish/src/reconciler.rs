//! Remote existence check.
//!
//! The ledger can be lost or out of date, so before every create the CMS is
//! searched for `"{title} {organization}"` and each hit's title compared with
//! the listing title.

use bridge_traits::publishing::{PublishingEndpoint, RemotePost};
use core_ledger::NormalizedListing;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Minimum share of shared title words for a fuzzy match.
pub const TOKEN_OVERLAP_THRESHOLD: f64 = 0.8;

pub struct Reconciler {
    endpoint: Arc<dyn PublishingEndpoint>,
    search_limit: usize,
}

impl Reconciler {
    pub fn new(endpoint: Arc<dyn PublishingEndpoint>, search_limit: usize) -> Self {
        Self {
            endpoint,
            search_limit: search_limit.max(1),
        }
    }

    /// First remote post whose title matches the listing.
    ///
    /// Search failures count as "not found": a missed duplicate can be
    /// removed later, a dropped listing is never seen.
    #[instrument(skip(self, listing), fields(title = %listing.title))]
    pub async fn find_remote(&self, listing: &NormalizedListing) -> Option<RemotePost> {
        if listing.title.trim().is_empty() {
            return None;
        }

        let query = format!("{} {}", listing.title, listing.organization);
        let hits = match self.endpoint.search(query.trim(), self.search_limit).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "Remote search failed, assuming no match");
                return None;
            }
        };

        let found = hits
            .into_iter()
            .find(|hit| titles_match(&hit.title, &listing.title));
        if let Some(hit) = &found {
            debug!(remote_id = hit.id, remote_title = %hit.title, "Found existing remote post");
        }
        found
    }

    pub async fn exists_remote(&self, listing: &NormalizedListing) -> bool {
        self.find_remote(listing).await.is_some()
    }
}

fn word_set(title: &str) -> HashSet<String> {
    title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// |A ∩ B| / max(|A|, |B|) over lower-cased alphanumeric word sets.
pub fn token_overlap(a: &str, b: &str) -> f64 {
    let a = word_set(a);
    let b = word_set(b);
    let larger = a.len().max(b.len());
    if larger == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / larger as f64
}

/// Exact case-insensitive equality, or token overlap at or above
/// [`TOKEN_OVERLAP_THRESHOLD`].
pub fn titles_match(candidate: &str, title: &str) -> bool {
    let candidate = candidate.trim();
    let title = title.trim();
    if title.is_empty() {
        return false;
    }
    candidate.to_lowercase() == title.to_lowercase()
        || token_overlap(candidate, title) >= TOKEN_OVERLAP_THRESHOLD
}
