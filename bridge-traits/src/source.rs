//! Source Connector Abstraction
//!
//! A source connector turns a free-text query into a list of raw listing
//! records. Connectors never fail the caller: a source that errors or answers
//! with a non-success status yields an empty list.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Listing record as returned by a source, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    pub id: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub logo_url: Option<String>,
    /// Source-specific fields kept for enrichment (`company_domain`,
    /// `company_website`, `tags`, ...)
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl RawListing {
    /// String value of an `extra` field, if present and non-blank.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// One query along the configured axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQuery {
    /// Joined query text, e.g. `"python developer Berlin Germany"`
    pub text: String,
    /// City or country used by sources with a dedicated location parameter
    pub location: Option<String>,
}

impl SourceQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Job listing source
#[async_trait]
pub trait SourceConnector: Send + Sync {
    /// Stable source name used in logs and configuration (`remotive`, ...).
    fn name(&self) -> &str;

    /// Fetch at most `limit` listings for the query.
    async fn fetch(&self, query: &SourceQuery, limit: usize) -> Vec<RawListing>;
}
