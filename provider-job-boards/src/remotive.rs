//! Remotive (`remotive.com/api/remote-jobs`)

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest};
use bridge_traits::retry::RetryPolicy;
use bridge_traits::source::{RawListing, SourceConnector, SourceQuery};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

use crate::client::{namespaced, non_empty, or_empty, JsonClient};
use crate::error::Result;

const API_URL: &str = "https://remotive.com/api/remote-jobs";
pub const NAME: &str = "remotive";

#[derive(Debug, Deserialize)]
struct RemotiveResponse {
    #[serde(default)]
    jobs: Vec<RemotiveJob>,
}

#[derive(Debug, Deserialize)]
struct RemotiveJob {
    #[serde(default)]
    id: Value,
    title: Option<String>,
    company_name: Option<String>,
    company_logo: Option<String>,
    candidate_required_location: Option<String>,
    description: Option<String>,
    url: Option<String>,
    job_apply_url: Option<String>,
}

impl RemotiveJob {
    fn into_raw(self) -> RawListing {
        RawListing {
            id: namespaced(NAME, &self.id),
            title: self.title,
            company: self.company_name,
            location: self.candidate_required_location,
            description: self.description,
            url: non_empty(self.url).or(self.job_apply_url),
            logo_url: non_empty(self.company_logo),
            ..Default::default()
        }
    }
}

pub struct RemotiveConnector {
    client: JsonClient,
}

impl RemotiveConnector {
    pub fn new(http_client: Arc<dyn HttpClient>, retry: RetryPolicy) -> Self {
        Self {
            client: JsonClient::new(http_client, retry),
        }
    }

    async fn fetch_listings(&self, query: &SourceQuery, limit: usize) -> Result<Vec<RawListing>> {
        let url = format!("{}?search={}", API_URL, urlencoding::encode(&query.text));
        let response: RemotiveResponse = self.client.get(NAME, HttpRequest::get(url)).await?;

        Ok(response
            .jobs
            .into_iter()
            .take(limit)
            .map(RemotiveJob::into_raw)
            .collect())
    }
}

#[async_trait]
impl SourceConnector for RemotiveConnector {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip(self), fields(query = %query.text))]
    async fn fetch(&self, query: &SourceQuery, limit: usize) -> Vec<RawListing> {
        or_empty(NAME, &query.text, self.fetch_listings(query, limit).await)
    }
}
