//! JSearch on RapidAPI (`jsearch.p.rapidapi.com/search`)

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest};
use bridge_traits::retry::RetryPolicy;
use bridge_traits::source::{RawListing, SourceConnector, SourceQuery};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::instrument;

use crate::client::{namespaced, non_empty, or_empty, JsonClient};
use crate::error::Result;

const API_HOST: &str = "jsearch.p.rapidapi.com";
pub const NAME: &str = "jsearch";

#[derive(Debug, Deserialize)]
struct JSearchResponse {
    #[serde(default)]
    data: Vec<JSearchJob>,
}

#[derive(Debug, Deserialize)]
struct JSearchJob {
    #[serde(default)]
    job_id: Value,
    job_title: Option<String>,
    employer_name: Option<String>,
    employer_logo: Option<String>,
    employer_website: Option<String>,
    job_city: Option<String>,
    job_country: Option<String>,
    job_description: Option<String>,
    job_apply_link: Option<String>,
}

impl JSearchJob {
    fn into_raw(self, fallback_location: Option<&str>) -> RawListing {
        let mut extra = Map::new();
        if let Some(website) = non_empty(self.employer_website) {
            extra.insert("company_website".to_string(), Value::String(website));
        }
        if let Some(country) = non_empty(self.job_country) {
            extra.insert("country".to_string(), Value::String(country));
        }

        RawListing {
            id: namespaced(NAME, &self.job_id),
            title: self.job_title,
            company: self.employer_name,
            location: non_empty(self.job_city).or_else(|| fallback_location.map(str::to_string)),
            description: self.job_description,
            url: self.job_apply_link,
            logo_url: non_empty(self.employer_logo),
            extra,
        }
    }
}

pub struct JSearchConnector {
    client: JsonClient,
    api_key: String,
}

impl JSearchConnector {
    pub fn new(http_client: Arc<dyn HttpClient>, retry: RetryPolicy, api_key: impl Into<String>) -> Self {
        Self {
            client: JsonClient::new(http_client, retry),
            api_key: api_key.into(),
        }
    }

    async fn fetch_listings(&self, query: &SourceQuery, limit: usize) -> Result<Vec<RawListing>> {
        let location = query.location.as_deref();
        let url = format!(
            "https://{}/search?query={}&location={}&page=1&num_pages=1",
            API_HOST,
            urlencoding::encode(&query.text),
            urlencoding::encode(location.unwrap_or_default())
        );
        let request = HttpRequest::get(url)
            .header("X-RapidAPI-Key", self.api_key.clone())
            .header("X-RapidAPI-Host", API_HOST);

        let response: JSearchResponse = self.client.get(NAME, request).await?;

        Ok(response
            .data
            .into_iter()
            .take(limit)
            .map(|job| job.into_raw(location))
            .collect())
    }
}

#[async_trait]
impl SourceConnector for JSearchConnector {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip(self), fields(query = %query.text))]
    async fn fetch(&self, query: &SourceQuery, limit: usize) -> Vec<RawListing> {
        or_empty(NAME, &query.text, self.fetch_listings(query, limit).await)
    }
}
