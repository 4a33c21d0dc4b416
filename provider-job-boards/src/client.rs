//! Shared GET-and-decode plumbing for the JSON sources.

use bridge_traits::http::{HttpClient, HttpRequest};
use bridge_traits::retry::RetryPolicy;
use bridge_traits::source::RawListing;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Result, SourceError};

const BODY_EXCERPT_CHARS: usize = 300;

#[derive(Clone)]
pub(crate) struct JsonClient {
    http_client: Arc<dyn HttpClient>,
    retry: RetryPolicy,
    timeout: Duration,
}

impl JsonClient {
    pub(crate) fn new(http_client: Arc<dyn HttpClient>, retry: RetryPolicy) -> Self {
        Self {
            http_client,
            retry,
            timeout: Duration::from_secs(20),
        }
    }

    /// GET `request` with transport retries and decode a 200 body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, source: &str, request: HttpRequest) -> Result<T> {
        let request = request
            .header("Accept", "application/json")
            .timeout(self.timeout);

        let response = self
            .retry
            .run(source, || self.http_client.execute(request.clone()))
            .await?;

        if response.status != 200 {
            return Err(SourceError::ApiError {
                status_code: response.status,
                message: response.body_excerpt(BODY_EXCERPT_CHARS),
            });
        }

        serde_json::from_slice(&response.body).map_err(|e| SourceError::ParseError(e.to_string()))
    }
}

/// Log a failed fetch and fall back to no results.
pub(crate) fn or_empty(source: &str, query: &str, result: Result<Vec<RawListing>>) -> Vec<RawListing> {
    match result {
        Ok(listings) => {
            debug!(source, query, count = listings.len(), "Fetched listings");
            listings
        }
        Err(SourceError::ApiError { status_code, message }) => {
            warn!(source, query, status = status_code, body = %message, "Source returned an error status");
            Vec::new()
        }
        Err(e) => {
            warn!(source, query, error = %e, "Source fetch failed");
            Vec::new()
        }
    }
}

/// Source ids are numbers or strings depending on the API.
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Prefix a source id with the source name so ids from different boards
/// never collide in the ledger.
pub(crate) fn namespaced(source: &str, id: &Value) -> Option<String> {
    id_string(id).map(|id| format!("{}:{}", source, id))
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
