//! Himalayas (`himalayas.app/jobs/api`)

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

const API_URL: &str = "https://himalayas.app/jobs/api";
const JOB_PAGE_URL: &str = "https://himalayas.app/jobs";
pub const NAME: &str = "himalayas";

#[derive(Debug, Deserialize)]
struct HimalayasResponse {
    #[serde(default)]
    jobs: Vec<HimalayasJob>,
}

/// `locationRestrictions` is a list of countries on current API versions and
/// a plain string on older ones.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LocationRestrictions {
    List(Vec<String>),
    Text(String),
}

impl LocationRestrictions {
    fn render(self) -> Option<String> {
        let text = match self {
            LocationRestrictions::List(countries) => countries.join(", "),
            LocationRestrictions::Text(text) => text,
        };
        non_empty(Some(text))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HimalayasJob {
    #[serde(default)]
    id: Value,
    title: Option<String>,
    company_name: Option<String>,
    company_logo: Option<String>,
    company_slug: Option<String>,
    location_restrictions: Option<LocationRestrictions>,
    description: Option<String>,
    slug: Option<String>,
    application_link: Option<String>,
}

impl HimalayasJob {
    fn into_raw(self) -> RawListing {
        let id = namespaced(NAME, &self.id)
            .or_else(|| non_empty(self.slug.clone()).map(|slug| format!("{}:{}", NAME, slug)));
        let url = match non_empty(self.slug) {
            Some(slug) => format!("{}/{}", JOB_PAGE_URL, slug),
            None => self.application_link.unwrap_or_default(),
        };

        let mut extra = Map::new();
        if let Some(company_slug) = non_empty(self.company_slug) {
            extra.insert("company_slug".to_string(), Value::String(company_slug));
        }

        RawListing {
            id,
            title: self.title,
            company: self.company_name,
            location: Some(
                self.location_restrictions
                    .and_then(LocationRestrictions::render)
                    .unwrap_or_else(|| "Remote".to_string()),
            ),
            description: self.description,
            url: non_empty(Some(url)),
            logo_url: non_empty(self.company_logo),
            extra,
        }
    }
}

pub struct HimalayasConnector {
    client: JsonClient,
}

impl HimalayasConnector {
    pub fn new(http_client: Arc<dyn HttpClient>, retry: RetryPolicy) -> Self {
        Self {
            client: JsonClient::new(http_client, retry),
        }
    }

    async fn fetch_listings(&self, query: &SourceQuery, limit: usize) -> Result<Vec<RawListing>> {
        let mut url = format!("{}?limit={}", API_URL, limit);
        if !query.text.trim().is_empty() {
            url.push_str(&format!("&q={}", urlencoding::encode(query.text.trim())));
        }
        let response: HimalayasResponse = self.client.get(NAME, HttpRequest::get(url)).await?;

        Ok(response
            .jobs
            .into_iter()
            .take(limit)
            .map(HimalayasJob::into_raw)
            .collect())
    }
}

#[async_trait]
impl SourceConnector for HimalayasConnector {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip(self), fields(query = %query.text))]
    async fn fetch(&self, query: &SourceQuery, limit: usize) -> Vec<RawListing> {
        or_empty(NAME, &query.text, self.fetch_listings(query, limit).await)
    }
}
