//! Arbeitnow (`arbeitnow.com/api/job-board-api`)

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest};
use bridge_traits::retry::RetryPolicy;
use bridge_traits::source::{RawListing, SourceConnector, SourceQuery};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::instrument;

use crate::client::{non_empty, or_empty, JsonClient};
use crate::error::Result;

const API_URL: &str = "https://arbeitnow.com/api/job-board-api";
pub const NAME: &str = "arbeitnow";

#[derive(Debug, Deserialize)]
struct ArbeitnowResponse {
    #[serde(default)]
    data: Vec<ArbeitnowJob>,
}

#[derive(Debug, Deserialize)]
struct ArbeitnowJob {
    slug: Option<String>,
    #[serde(default)]
    title: String,
    company_name: Option<String>,
    location: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(default)]
    remote: bool,
    #[serde(default)]
    tags: Vec<String>,
}

impl ArbeitnowJob {
    fn into_raw(self) -> RawListing {
        let mut extra = Map::new();
        extra.insert("remote".to_string(), Value::Bool(self.remote));
        extra.insert(
            "tags".to_string(),
            Value::Array(self.tags.into_iter().map(Value::String).collect()),
        );

        RawListing {
            id: non_empty(self.slug).map(|slug| format!("{}:{}", NAME, slug.trim())),
            title: Some(self.title),
            company: self.company_name,
            location: self.location,
            description: self.description,
            url: self.url,
            logo_url: None,
            extra,
        }
    }
}

pub struct ArbeitnowConnector {
    client: JsonClient,
}

impl ArbeitnowConnector {
    pub fn new(http_client: Arc<dyn HttpClient>, retry: RetryPolicy) -> Self {
        Self {
            client: JsonClient::new(http_client, retry),
        }
    }

    async fn fetch_listings(&self, query: &SourceQuery, limit: usize) -> Result<Vec<RawListing>> {
        let response: ArbeitnowResponse = self.client.get(NAME, HttpRequest::get(API_URL)).await?;
        let needle = query.text.trim().to_lowercase();

        Ok(response
            .data
            .into_iter()
            .filter(|job| needle.is_empty() || job.title.to_lowercase().contains(&needle))
            .take(limit)
            .map(ArbeitnowJob::into_raw)
            .collect())
    }
}

#[async_trait]
impl SourceConnector for ArbeitnowConnector {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip(self), fields(query = %query.text))]
    async fn fetch(&self, query: &SourceQuery, limit: usize) -> Vec<RawListing> {
        or_empty(NAME, &query.text, self.fetch_listings(query, limit).await)
    }
}
