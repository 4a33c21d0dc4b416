//! Publishing a single listing.

use bridge_traits::error::BridgeError;
use bridge_traits::publishing::{PostDraft, PublishingEndpoint, RemotePost};
use bridge_traits::retry::RetryPolicy;
use core_ledger::{is_acceptable, NormalizedListing};
use core_runtime::Pacer;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::content::PostTemplate;
use crate::error::{PublishError, Result};
use crate::media::LogoAsset;
use crate::reconciler::Reconciler;
use crate::route::RouteResolver;

/// Reference to a created remote post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    pub id: u64,
    pub url: String,
}

impl From<RemotePost> for RemoteRef {
    fn from(post: RemotePost) -> Self {
        Self {
            id: post.id,
            url: post.url,
        }
    }
}

/// Runs admission, reconciliation, media upload and create for one listing
/// at a time. Route resolution is remembered between calls until
/// [`Publisher::start_run`].
pub struct Publisher {
    endpoint: Arc<dyn PublishingEndpoint>,
    reconciler: Reconciler,
    routes: RouteResolver,
    template: PostTemplate,
    retry: RetryPolicy,
    pacer: Pacer,
}

impl Publisher {
    pub fn new(
        endpoint: Arc<dyn PublishingEndpoint>,
        reconciler: Reconciler,
        routes: RouteResolver,
        template: PostTemplate,
    ) -> Self {
        Self {
            endpoint,
            reconciler,
            routes,
            template,
            retry: RetryPolicy::default(),
            pacer: Pacer::disabled(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Pause applied after each remote call made while publishing.
    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn set_pacer(&mut self, pacer: Pacer) {
        self.pacer = pacer;
    }

    /// Reset per-run state.
    pub fn start_run(&mut self) {
        self.routes.reset();
    }

    pub fn routes(&self) -> &RouteResolver {
        &self.routes
    }

    pub fn template_mut(&mut self) -> &mut PostTemplate {
        &mut self.template
    }

    /// Publish a listing.
    ///
    /// `AlreadyExists` means the remote already has an equivalent post; the
    /// caller should record the listing without a post reference.
    #[instrument(skip_all, fields(title = %listing.title, organization = %listing.organization))]
    pub async fn publish(
        &mut self,
        listing: &NormalizedListing,
        logo: Option<LogoAsset>,
    ) -> Result<RemoteRef> {
        if !is_acceptable(listing) {
            return Err(PublishError::InvalidListing);
        }

        let existing = self.reconciler.find_remote(listing).await;
        self.pacer.pause("reconcile").await;
        if let Some(post) = existing {
            return Err(PublishError::AlreadyExists { remote_id: post.id });
        }

        let featured_media = match logo {
            Some(asset) => {
                let filename = asset.filename.clone();
                let uploaded = self.endpoint.upload_media(asset.into_upload()).await;
                self.pacer.pause("media_upload").await;
                match uploaded {
                    Ok(media) => Some(media.id),
                    Err(e) => {
                        warn!(filename = %filename, error = %e, "Logo upload failed, publishing without image");
                        None
                    }
                }
            }
            None => None,
        };

        let draft = self.template.render(listing, featured_media);
        let created = self.create(&draft).await;
        self.pacer.pause("publish").await;

        let post = created?;
        info!(post_id = post.id, url = %post.url, "Published listing");
        Ok(post.into())
    }

    /// Create on the resolved route, falling back once if the primary route
    /// does not exist.
    async fn create(&mut self, draft: &PostDraft) -> Result<RemotePost> {
        let route = self.routes.route_for_create().to_string();

        match self.create_on(&route, draft).await {
            Ok(post) => {
                self.routes.record_success(&route);
                Ok(post)
            }
            Err(BridgeError::RouteNotFound(missing)) => {
                let Some(fallback) = self.routes.record_route_not_found(&route) else {
                    return Err(BridgeError::RouteNotFound(missing).into());
                };
                Ok(self.create_on(&fallback, draft).await?)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create_on(
        &self,
        route: &str,
        draft: &PostDraft,
    ) -> std::result::Result<RemotePost, BridgeError> {
        self.retry
            .run("create_post", || self.endpoint.create_post(route, draft))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::publishing::{MediaRef, MediaUpload};
    use bridge_traits::retry::Jitter;
    use bytes::Bytes;
    use mockall::{mock, Sequence};
    use std::time::Duration;

    mock! {
        Endpoint {}

        #[async_trait]
        impl PublishingEndpoint for Endpoint {
            async fn ping(&self) -> BridgeResult<()>;
            async fn search(&self, query: &str, limit: usize) -> BridgeResult<Vec<RemotePost>>;
            async fn create_post(&self, route: &str, draft: &PostDraft) -> BridgeResult<RemotePost>;
            async fn upload_media(&self, upload: MediaUpload) -> BridgeResult<MediaRef>;
            async fn recent_posts(&self, route: &str, limit: usize) -> BridgeResult<Vec<RemotePost>>;
        }
    }

    fn listing(title: &str) -> NormalizedListing {
        NormalizedListing {
            title: title.to_string(),
            organization: "Acme".to_string(),
            locale: "Remote".to_string(),
            apply_url: "https://x.com/1".to_string(),
            ..Default::default()
        }
    }

    fn created(id: u64, route: &str) -> RemotePost {
        RemotePost {
            id,
            title: "Data Engineer".to_string(),
            url: format!("https://jobs.example.com/?p={}", id),
            post_type: Some(route.to_string()),
        }
    }

    fn publisher(endpoint: MockEndpoint) -> Publisher {
        let endpoint: Arc<dyn PublishingEndpoint> = Arc::new(endpoint);
        Publisher::new(
            endpoint.clone(),
            Reconciler::new(endpoint, 10),
            RouteResolver::new("job_listing", "posts"),
            PostTemplate::new("draft", Vec::new()),
        )
        .with_retry(RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            use_exponential_backoff: true,
            jitter: Jitter::None,
        })
    }

    fn no_remote_match(endpoint: &mut MockEndpoint) {
        endpoint.expect_search().returning(|_, _| Ok(Vec::new()));
    }

    #[tokio::test]
    async fn test_invalid_listing_makes_no_calls() {
        let mut endpoint = MockEndpoint::new();
        endpoint.expect_search().times(0);
        endpoint.expect_create_post().times(0);

        let mut empty = listing("");
        empty.apply_url.clear();
        assert_eq!(
            publisher(endpoint).publish(&empty, None).await,
            Err(PublishError::InvalidListing)
        );
    }

    #[tokio::test]
    async fn test_remote_match_is_already_exists() {
        let mut endpoint = MockEndpoint::new();
        endpoint
            .expect_search()
            .times(1)
            .returning(|_, _| Ok(vec![created(118, "job_listing")]));
        endpoint.expect_create_post().times(0);

        let result = publisher(endpoint).publish(&listing("Data Engineer"), None).await;
        assert_eq!(result, Err(PublishError::AlreadyExists { remote_id: 118 }));
    }

    #[tokio::test]
    async fn test_publish_with_logo() {
        let mut endpoint = MockEndpoint::new();
        no_remote_match(&mut endpoint);
        endpoint
            .expect_upload_media()
            .times(1)
            .returning(|_| {
                Ok(MediaRef {
                    id: 9,
                    url: "https://jobs.example.com/acme.png".to_string(),
                })
            });
        endpoint
            .expect_create_post()
            .withf(|route, draft| route == "job_listing" && draft.featured_media == Some(9))
            .times(1)
            .returning(|route, _| Ok(created(42, route)));

        let logo = LogoAsset {
            filename: "acme-12345678.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: Bytes::from_static(b"png"),
        };
        let mut publisher = publisher(endpoint);
        let remote = publisher.publish(&listing("Data Engineer"), Some(logo)).await.unwrap();

        assert_eq!(remote.id, 42);
        assert_eq!(publisher.routes().state(), crate::route::RouteState::ResolvedPrimary);
    }

    #[tokio::test]
    async fn test_media_failure_is_not_fatal() {
        let mut endpoint = MockEndpoint::new();
        no_remote_match(&mut endpoint);
        endpoint
            .expect_upload_media()
            .times(1)
            .returning(|_| Err(BridgeError::Status { status: 413, body: "too large".to_string() }));
        endpoint
            .expect_create_post()
            .withf(|_, draft| draft.featured_media.is_none())
            .times(1)
            .returning(|route, _| Ok(created(43, route)));

        let logo = LogoAsset {
            filename: "acme-12345678.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: Bytes::from_static(b"png"),
        };
        let remote = publisher(endpoint)
            .publish(&listing("Data Engineer"), Some(logo))
            .await
            .unwrap();
        assert_eq!(remote.id, 43);
    }

    #[tokio::test]
    async fn test_route_fallback_is_remembered() {
        let mut endpoint = MockEndpoint::new();
        no_remote_match(&mut endpoint);
        endpoint
            .expect_create_post()
            .withf(|route, _| route == "job_listing")
            .times(1)
            .returning(|route, _| Err(BridgeError::RouteNotFound(route.to_string())));
        endpoint
            .expect_create_post()
            .withf(|route, _| route == "posts")
            .times(2)
            .returning(|route, _| Ok(created(50, route)));

        let mut publisher = publisher(endpoint);
        publisher.start_run();
        assert!(publisher.publish(&listing("Data Engineer"), None).await.is_ok());
        assert!(publisher.publish(&listing("Backend Developer"), None).await.is_ok());
        assert_eq!(publisher.routes().current_route(), "posts");
    }

    #[tokio::test]
    async fn test_rejection_is_not_retried() {
        let mut endpoint = MockEndpoint::new();
        no_remote_match(&mut endpoint);
        endpoint.expect_create_post().times(1).returning(|_, _| {
            Err(BridgeError::Status {
                status: 400,
                body: "rest_invalid_param".to_string(),
            })
        });

        let result = publisher(endpoint).publish(&listing("Data Engineer"), None).await;
        assert_eq!(
            result,
            Err(PublishError::RemoteRejected {
                status: 400,
                body_excerpt: "rest_invalid_param".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_transport_failures_exhaust_retries() {
        let mut endpoint = MockEndpoint::new();
        no_remote_match(&mut endpoint);
        let mut seq = Sequence::new();
        endpoint
            .expect_create_post()
            .times(3)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(BridgeError::Transport("connection reset".to_string())));

        let result = publisher(endpoint).publish(&listing("Data Engineer"), None).await;
        assert!(matches!(result, Err(PublishError::Unreachable(_))));
    }

    #[tokio::test]
    async fn test_transient_failure_then_success() {
        let mut endpoint = MockEndpoint::new();
        no_remote_match(&mut endpoint);
        let mut seq = Sequence::new();
        endpoint
            .expect_create_post()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(BridgeError::Transport("timed out".to_string())));
        endpoint
            .expect_create_post()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|route, _| Ok(created(77, route)));

        let remote = publisher(endpoint)
            .publish(&listing("Data Engineer"), None)
            .await
            .unwrap();
        assert_eq!(remote.id, 77);
    }
}
