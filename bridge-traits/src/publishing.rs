//! Publishing Endpoint Abstraction
//!
//! The remote CMS as seen by the sync engine: a search capability used for
//! reconciliation, post creation on a named route, media upload and a short
//! read-back of recent posts. Authentication belongs to the transport.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A post (or search hit) that already exists on the remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePost {
    pub id: u64,
    /// Rendered title, HTML entities decoded
    pub title: String,
    pub url: String,
    /// Remote post type, e.g. `post` or `job_listing`
    pub post_type: Option<String>,
}

/// Content submitted to a create route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub slug: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_media: Option<u64>,
}

/// Binary upload for the media library.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Reference to an uploaded media item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    pub id: u64,
    pub url: String,
}

/// Remote publishing endpoint
///
/// Implementations perform a single request per call. Errors follow the
/// [`BridgeError`](crate::error::BridgeError) contract: `Transport` when the
/// remote never answered, `Status` for any non-success answer and
/// `RouteNotFound` when the requested create route does not exist on this
/// deployment.
#[async_trait]
pub trait PublishingEndpoint: Send + Sync {
    /// Check that the API root answers at all.
    async fn ping(&self) -> Result<()>;

    /// Free-text search over existing content.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<RemotePost>>;

    /// Create a post on the given route (post type collection).
    async fn create_post(&self, route: &str, draft: &PostDraft) -> Result<RemotePost>;

    /// Upload a media item.
    async fn upload_media(&self, upload: MediaUpload) -> Result<MediaRef>;

    /// Most recent posts on a route, newest first.
    async fn recent_posts(&self, route: &str, limit: usize) -> Result<Vec<RemotePost>>;
}
