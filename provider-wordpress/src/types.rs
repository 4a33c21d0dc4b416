//! WordPress REST API response types

use serde::Deserialize;

/// Item of `GET /wp/v2/search`
///
/// See: https://developer.wordpress.org/rest-api/reference/search-results/
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub id: u64,
    /// Plain title, HTML entities encoded
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    /// Object subtype, e.g. `post` or `job_listing`
    #[serde(default)]
    pub subtype: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

/// Post resource as returned by create and list calls
#[derive(Debug, Clone, Deserialize)]
pub struct PostResponse {
    pub id: u64,
    #[serde(default)]
    pub link: String,
    pub title: Option<Rendered>,
    #[serde(rename = "type", default)]
    pub post_type: Option<String>,
}

/// Media resource as returned by `POST /wp/v2/media`
#[derive(Debug, Clone, Deserialize)]
pub struct MediaResponse {
    pub id: u64,
    #[serde(default)]
    pub source_url: String,
}

/// Error body of a failed REST call
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}
