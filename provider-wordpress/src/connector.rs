//! WordPress REST API connector implementation
//!
//! Implements the `PublishingEndpoint` trait over `/wp-json/wp/v2`.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::publishing::{MediaRef, MediaUpload, PostDraft, PublishingEndpoint, RemotePost};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::WordPressError;
use crate::types::{ErrorBody, MediaResponse, PostResponse, SearchResult};

/// REST namespace for core endpoints
const API_PREFIX: &str = "/wp-json/wp/v2";

/// WordPress caps `per_page` at 100
const MAX_PER_PAGE: usize = 100;

/// Characters of an error body kept in errors and logs
const BODY_EXCERPT_CHARS: usize = 300;

/// WordPress REST API connector
///
/// Authenticates with an application password (HTTP Basic). Every method is
/// a single attempt; retry policy belongs to the caller.
///
/// # Example
///
/// ```ignore
/// use provider_wordpress::WordPressConnector;
/// use bridge_traits::publishing::PublishingEndpoint;
///
/// let connector = WordPressConnector::new(http_client, "https://jobs.example.com", "editor", "abcd efgh");
/// connector.ping().await?;
/// let hits = connector.search("Data Engineer Acme", 10).await?;
/// ```
pub struct WordPressConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// Site root without trailing slash
    base_url: String,

    /// Precomputed `Authorization` header value
    auth_header: String,

    /// Per-request timeout
    timeout: Duration,
}

impl WordPressConnector {
    /// Create a new WordPress connector
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `base_url` - Site root, e.g. `https://jobs.example.com`
    /// * `username` - WordPress user owning the application password
    /// * `app_password` - Application password (spaces are allowed)
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        username: &str,
        app_password: &str,
    ) -> Self {
        let credentials = STANDARD.encode(format!("{}:{}", username, app_password));
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_header: format!("Basic {}", credentials),
            timeout: Duration::from_secs(20),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}/{}", self.base_url, API_PREFIX, path.trim_start_matches('/'))
    }

    fn request(&self, request: HttpRequest) -> HttpRequest {
        request
            .header("Authorization", self.auth_header.clone())
            .header("Accept", "application/json")
            .timeout(self.timeout)
    }

    /// Map a non-success response to an error.
    ///
    /// A 404 on a post type route means the type is not registered on the
    /// site (`rest_no_route`).
    fn error_for(response: &HttpResponse, route: Option<&str>) -> WordPressError {
        let excerpt = response.body_excerpt(BODY_EXCERPT_CHARS);
        let code = response
            .json::<ErrorBody>()
            .map(|body| body.code)
            .unwrap_or_default();

        if let Some(route) = route {
            if response.status == 404 || code == "rest_no_route" {
                debug!(route, code = %code, "Route not found");
                return WordPressError::RouteNotFound(route.to_string());
            }
        }

        WordPressError::ApiError {
            status_code: response.status,
            message: excerpt,
        }
    }

    fn convert_post(post: PostResponse) -> RemotePost {
        RemotePost {
            id: post.id,
            title: post
                .title
                .map(|t| decode_entities(&t.rendered))
                .unwrap_or_default(),
            url: post.link,
            post_type: post.post_type,
        }
    }
}

#[async_trait]
impl PublishingEndpoint for WordPressConnector {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn ping(&self) -> Result<()> {
        let url = format!("{}/wp-json/", self.base_url);
        let response = self.http_client.execute(self.request(HttpRequest::get(url))).await?;

        if !response.is_success() {
            warn!(status = response.status, "Endpoint ping failed");
            return Err(Self::error_for(&response, None).into());
        }

        debug!("Endpoint reachable");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<RemotePost>> {
        let url = format!(
            "{}?search={}&per_page={}",
            self.endpoint("search"),
            urlencoding::encode(query),
            limit.clamp(1, MAX_PER_PAGE)
        );
        let response = self.http_client.execute(self.request(HttpRequest::get(url))).await?;

        if !response.is_success() {
            return Err(Self::error_for(&response, None).into());
        }

        let results: Vec<SearchResult> = response
            .json()
            .map_err(|e| WordPressError::ParseError(e.to_string()))?;

        debug!(hits = results.len(), "Search completed");
        Ok(results
            .into_iter()
            .map(|hit| RemotePost {
                id: hit.id,
                title: decode_entities(&hit.title),
                url: hit.url,
                post_type: hit.subtype,
            })
            .collect())
    }

    #[instrument(skip(self, draft), fields(slug = %draft.slug))]
    async fn create_post(&self, route: &str, draft: &PostDraft) -> Result<RemotePost> {
        let request = self.request(HttpRequest::post(self.endpoint(route)).json(draft)?);
        let response = self.http_client.execute(request).await?;

        if !response.is_success() {
            return Err(Self::error_for(&response, Some(route)).into());
        }

        let post: PostResponse = response
            .json()
            .map_err(|e| WordPressError::ParseError(e.to_string()))?;

        info!(post_id = post.id, route, "Created post");
        Ok(Self::convert_post(post))
    }

    #[instrument(skip(self, upload), fields(filename = %upload.filename, size = upload.bytes.len()))]
    async fn upload_media(&self, upload: MediaUpload) -> Result<MediaRef> {
        let request = self.request(
            HttpRequest::post(self.endpoint("media"))
                .header(
                    "Content-Disposition",
                    format!("attachment; filename=\"{}\"", upload.filename),
                )
                .header("Content-Type", upload.content_type)
                .body(upload.bytes),
        );
        let response = self.http_client.execute(request).await?;

        if !response.is_success() {
            return Err(Self::error_for(&response, None).into());
        }

        let media: MediaResponse = response
            .json()
            .map_err(|e| WordPressError::ParseError(e.to_string()))?;

        debug!(media_id = media.id, "Uploaded media");
        Ok(MediaRef {
            id: media.id,
            url: media.source_url,
        })
    }

    #[instrument(skip(self))]
    async fn recent_posts(&self, route: &str, limit: usize) -> Result<Vec<RemotePost>> {
        let url = format!(
            "{}?per_page={}&orderby=date&order=desc",
            self.endpoint(route),
            limit.clamp(1, MAX_PER_PAGE)
        );
        let response = self.http_client.execute(self.request(HttpRequest::get(url))).await?;

        if !response.is_success() {
            return Err(Self::error_for(&response, Some(route)).into());
        }

        let posts: Vec<PostResponse> = response
            .json()
            .map_err(|e| WordPressError::ParseError(e.to_string()))?;

        Ok(posts.into_iter().map(Self::convert_post).collect())
    }
}

/// Decode the HTML entities WordPress puts in rendered titles.
///
/// Handles the named entities WordPress emits and all numeric references;
/// unknown entities are kept verbatim.
pub fn decode_entities(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('&') {
        output.push_str(&rest[..start]);
        let tail = &rest[start..];

        let decoded = tail.find(';').filter(|&end| end <= 10).and_then(|end| {
            let entity = &tail[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                "ndash" => Some('\u{2013}'),
                "mdash" => Some('\u{2014}'),
                "hellip" => Some('\u{2026}'),
                _ => {
                    let numeric = entity.strip_prefix('#')?;
                    let code = match numeric.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                        None => numeric.parse::<u32>().ok()?,
                    };
                    char::from_u32(code)
                }
            }?;
            Some((ch, end))
        });

        match decoded {
            Some((ch, end)) => {
                output.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                output.push('&');
                rest = &tail[1..];
            }
        }
    }

    output.push_str(rest);
    output
}
