//! Jobicy (`jobicy.com/api/v2/remote-jobs`)

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

const API_URL: &str = "https://jobicy.com/api/v2/remote-jobs";
pub const NAME: &str = "jobicy";

#[derive(Debug, Deserialize)]
struct JobicyResponse {
    #[serde(default)]
    jobs: Vec<JobicyJob>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobicyJob {
    #[serde(default)]
    id: Value,
    job_title: Option<String>,
    company_name: Option<String>,
    company_logo: Option<String>,
    job_geo: Option<String>,
    job_description: Option<String>,
    url: Option<String>,
}

impl JobicyJob {
    fn into_raw(self) -> RawListing {
        RawListing {
            id: namespaced(NAME, &self.id),
            title: self.job_title,
            company: self.company_name,
            location: Some(non_empty(self.job_geo).unwrap_or_else(|| "Remote".to_string())),
            description: self.job_description,
            url: self.url,
            logo_url: non_empty(self.company_logo),
            ..Default::default()
        }
    }
}

pub struct JobicyConnector {
    client: JsonClient,
}

impl JobicyConnector {
    pub fn new(http_client: Arc<dyn HttpClient>, retry: RetryPolicy) -> Self {
        Self {
            client: JsonClient::new(http_client, retry),
        }
    }

    async fn fetch_listings(&self, query: &SourceQuery, limit: usize) -> Result<Vec<RawListing>> {
        let mut url = format!("{}?count={}", API_URL, limit);
        if !query.text.trim().is_empty() {
            url.push_str(&format!("&tag={}", urlencoding::encode(query.text.trim())));
        }
        let response: JobicyResponse = self.client.get(NAME, HttpRequest::get(url)).await?;

        Ok(response
            .jobs
            .into_iter()
            .take(limit)
            .map(JobicyJob::into_raw)
            .collect())
    }
}

#[async_trait]
impl SourceConnector for JobicyConnector {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip(self), fields(query = %query.text))]
    async fn fetch(&self, query: &SourceQuery, limit: usize) -> Vec<RawListing> {
        or_empty(NAME, &query.text, self.fetch_listings(query, limit).await)
    }
}
