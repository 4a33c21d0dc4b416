//! RemoteOK (`remoteok.com/api`)
//!
//! The API ignores query parameters and returns its whole feed, preceded by
//! a legal notice object without an id. Filtering happens here.

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest};
use bridge_traits::retry::RetryPolicy;
use bridge_traits::source::{RawListing, SourceConnector, SourceQuery};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

use crate::client::{id_string, non_empty, or_empty, JsonClient};
use crate::error::Result;

const API_URL: &str = "https://remoteok.com/api";
pub const NAME: &str = "remoteok";

#[derive(Debug, Deserialize)]
struct RemoteOkJob {
    #[serde(default)]
    id: Value,
    position: Option<String>,
    title: Option<String>,
    company: Option<String>,
    company_logo: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    location: Option<String>,
    description: Option<String>,
    url: Option<String>,
    apply_url: Option<String>,
}

impl RemoteOkJob {
    fn title(&self) -> String {
        non_empty(self.position.clone())
            .or_else(|| self.title.clone())
            .unwrap_or_default()
    }

    /// Lower-cased `title company tags`, the text the query must occur in.
    fn haystack(&self) -> String {
        format!(
            "{} {} {}",
            self.title(),
            self.company.as_deref().unwrap_or_default(),
            self.tags.join(" ")
        )
        .to_lowercase()
    }

    fn into_raw(self, id: String) -> RawListing {
        let title = self.title();
        let url = non_empty(self.url)
            .or(non_empty(self.apply_url))
            .unwrap_or_else(|| format!("https://remoteok.com/remote-jobs/{}", id));

        RawListing {
            id: Some(format!("{}:{}", NAME, id)),
            title: Some(title),
            company: self.company,
            location: self.location,
            description: self.description,
            url: Some(url),
            logo_url: non_empty(self.company_logo),
            ..Default::default()
        }
    }
}

pub struct RemoteOkConnector {
    client: JsonClient,
}

impl RemoteOkConnector {
    pub fn new(http_client: Arc<dyn HttpClient>, retry: RetryPolicy) -> Self {
        Self {
            client: JsonClient::new(http_client, retry),
        }
    }

    async fn fetch_listings(&self, query: &SourceQuery, limit: usize) -> Result<Vec<RawListing>> {
        let feed: Vec<Value> = self.client.get(NAME, HttpRequest::get(API_URL)).await?;
        let needle = query.text.trim().to_lowercase();

        let mut listings = Vec::new();
        for item in feed {
            if listings.len() >= limit {
                break;
            }
            // Skips the legal notice and anything else not shaped like a job
            let Ok(job) = serde_json::from_value::<RemoteOkJob>(item) else {
                continue;
            };
            let Some(id) = id_string(&job.id) else {
                continue;
            };
            if !needle.is_empty() && !job.haystack().contains(&needle) {
                continue;
            }
            listings.push(job.into_raw(id));
        }
        Ok(listings)
    }
}

#[async_trait]
impl SourceConnector for RemoteOkConnector {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip(self), fields(query = %query.text))]
    async fn fetch(&self, query: &SourceQuery, limit: usize) -> Vec<RawListing> {
        or_empty(NAME, &query.text, self.fetch_listings(query, limit).await)
    }
}
