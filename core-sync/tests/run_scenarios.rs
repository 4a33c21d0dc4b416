//! End-to-end run scenarios
//!
//! These tests drive a full `RunOrchestrator` against an in-memory CMS and
//! source:
//! - Fresh publish records the listing in the ledger
//! - A second run skips listings already in the ledger
//! - A listing already on the remote is backfilled, not posted
//! - A missing primary route falls back once and stays on the fallback
//! - Failures (unreachable root, rejected create) leave the ledger alone

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::publishing::{MediaRef, MediaUpload, PostDraft, PublishingEndpoint, RemotePost};
use bridge_traits::retry::RetryPolicy;
use bridge_traits::source::{RawListing, SourceConnector, SourceQuery};
use bridge_traits::time::FixedClock;
use core_ledger::identity::composite_key;
use core_ledger::{Ledger, LedgerEntry, LedgerStore, ListingKey};
use core_publish::{PostTemplate, Publisher, Reconciler, RouteResolver};
use core_runtime::config::{CountryConfig, RegionConfig};
use core_sync::{RunOrchestrator, RunSettings, SyncError};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const NOW: i64 = 1_760_000_000;
const DAY: i64 = 86_400;

// ============================================================================
// Fakes
// ============================================================================

#[derive(Default)]
struct CmsState {
    posts: Vec<RemotePost>,
    missing_routes: Vec<String>,
    unreachable: bool,
    reject_creates: bool,
    pings: usize,
    searches: usize,
    /// Route of every create attempt, in order
    creates: Vec<String>,
}

/// CMS that keeps created posts in memory and answers searches with all of
/// them.
#[derive(Default)]
struct FakeCms {
    state: Mutex<CmsState>,
}

impl FakeCms {
    fn with_posts(posts: Vec<RemotePost>) -> Self {
        let cms = Self::default();
        cms.state.lock().unwrap().posts = posts;
        cms
    }

    fn without_route(self, route: &str) -> Self {
        self.state.lock().unwrap().missing_routes.push(route.to_string());
        self
    }
}

#[async_trait]
impl PublishingEndpoint for FakeCms {
    async fn ping(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.pings += 1;
        if state.unreachable {
            return Err(BridgeError::Transport("connection refused".to_string()));
        }
        Ok(())
    }

    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<RemotePost>> {
        let mut state = self.state.lock().unwrap();
        state.searches += 1;
        Ok(state.posts.iter().take(limit).cloned().collect())
    }

    async fn create_post(&self, route: &str, draft: &PostDraft) -> Result<RemotePost> {
        let mut state = self.state.lock().unwrap();
        state.creates.push(route.to_string());
        if state.missing_routes.iter().any(|r| r == route) {
            return Err(BridgeError::RouteNotFound(route.to_string()));
        }
        if state.reject_creates {
            return Err(BridgeError::Status {
                status: 500,
                body: "internal error".to_string(),
            });
        }

        let id = 100 + state.posts.len() as u64;
        let post = RemotePost {
            id,
            title: draft.title.clone(),
            url: format!("https://jobs.example.com/?p={}", id),
            post_type: Some(route.to_string()),
        };
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn upload_media(&self, upload: MediaUpload) -> Result<MediaRef> {
        Ok(MediaRef {
            id: 1,
            url: format!("https://jobs.example.com/{}", upload.filename),
        })
    }

    async fn recent_posts(&self, route: &str, limit: usize) -> Result<Vec<RemotePost>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .posts
            .iter()
            .rev()
            .filter(|p| p.post_type.as_deref() == Some(route))
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Source that returns the same listings for every query.
struct FakeSource {
    listings: Vec<RawListing>,
    queries: Mutex<Vec<SourceQuery>>,
}

impl FakeSource {
    fn new(listings: Vec<RawListing>) -> Self {
        Self {
            listings,
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SourceConnector for FakeSource {
    fn name(&self) -> &str {
        "fake"
    }

    async fn fetch(&self, query: &SourceQuery, limit: usize) -> Vec<RawListing> {
        self.queries.lock().unwrap().push(query.clone());
        self.listings.iter().take(limit).cloned().collect()
    }
}

// ============================================================================
// Harness
// ============================================================================

fn temp_ledger() -> PathBuf {
    std::env::temp_dir().join(format!("jobsync-ledger-{}.json", uuid::Uuid::new_v4()))
}

fn raw(title: &str, company: &str, url: &str) -> RawListing {
    RawListing {
        title: Some(title.to_string()),
        company: Some(company.to_string()),
        url: Some(url.to_string()),
        ..Default::default()
    }
}

fn settings() -> RunSettings {
    RunSettings {
        regions: vec![RegionConfig::new("europe", "Europe").with_country(
            CountryConfig::new("DE", "Germany").with_locale("data engineer", Some("Berlin")),
        )],
        auto_rotate: false,
        process_region: None,
        retention: Duration::from_secs(90 * DAY as u64),
        pacing_base: Duration::ZERO,
        recent_sample: 5,
    }
}

fn orchestrator(
    cms: &Arc<FakeCms>,
    source: &Arc<FakeSource>,
    ledger: &PathBuf,
    settings: RunSettings,
) -> RunOrchestrator {
    let endpoint: Arc<dyn PublishingEndpoint> = cms.clone();
    let publisher = Publisher::new(
        endpoint.clone(),
        Reconciler::new(endpoint.clone(), 10),
        RouteResolver::new("job_listing", "posts"),
        PostTemplate::new("publish", vec!["jobs".to_string()]),
    )
    .with_retry(RetryPolicy::no_retry());

    RunOrchestrator::new(
        endpoint,
        publisher,
        LedgerStore::new(ledger.clone()),
        Arc::new(FixedClock::at_unix(NOW)),
        settings,
    )
    .with_source(source.clone(), 10)
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn fresh_listing_is_published_and_recorded() {
    let path = temp_ledger();
    let cms = Arc::new(FakeCms::default());
    let source = Arc::new(FakeSource::new(vec![raw("Data Engineer", "Acme", "https://x.com/1")]));

    let summary = orchestrator(&cms, &source, &path, settings()).run().await.unwrap();

    assert_eq!(summary.fetched, 1);
    assert_eq!(summary.published, 1);
    assert!(summary.ledger_saved);
    assert_eq!(summary.recent.len(), 1);

    let queries = source.queries.lock().unwrap();
    assert_eq!(queries[0].text, "data engineer Berlin Germany");
    assert_eq!(queries[0].location.as_deref(), Some("Berlin"));

    let ledger = LedgerStore::new(path.clone()).load().await;
    assert_eq!(ledger.len(), 1);
    let entry = &ledger.entries()[0];
    assert_eq!(entry.key, composite_key("Data Engineer", "Acme", "Remote"));
    assert_eq!(entry.first_seen, NOW);
    assert_eq!(entry.remote_post_ref.as_deref(), Some("100"));
    assert_eq!(cms.state.lock().unwrap().creates, vec!["job_listing"]);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn second_run_skips_ledgered_listing() {
    let path = temp_ledger();
    let cms = Arc::new(FakeCms::default());
    let source = Arc::new(FakeSource::new(vec![raw("Data Engineer", "Acme", "https://x.com/1")]));

    let first = orchestrator(&cms, &source, &path, settings()).run().await.unwrap();
    let second = orchestrator(&cms, &source, &path, settings()).run().await.unwrap();

    assert_eq!(first.published, 1);
    assert_eq!(second.published, 0);
    assert_eq!(second.skipped_duplicate, 1);
    assert!(!second.ledger_saved);

    let state = cms.state.lock().unwrap();
    assert_eq!(state.creates.len(), 1);
    // The ledger hit short-circuits before reconciliation
    assert_eq!(state.searches, 1);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn listing_already_on_remote_is_backfilled() {
    let path = temp_ledger();
    let cms = Arc::new(FakeCms::with_posts(vec![RemotePost {
        id: 7,
        title: "Engineer Data".to_string(),
        url: "https://jobs.example.com/?p=7".to_string(),
        post_type: Some("job_listing".to_string()),
    }]));
    let source = Arc::new(FakeSource::new(vec![raw("Data Engineer", "Acme", "https://x.com/1")]));

    let summary = orchestrator(&cms, &source, &path, settings()).run().await.unwrap();

    assert_eq!(summary.backfilled, 1);
    assert_eq!(summary.published, 0);
    assert!(cms.state.lock().unwrap().creates.is_empty());

    let ledger = LedgerStore::new(path.clone()).load().await;
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.entries()[0].remote_post_ref, None);
    assert_eq!(ledger.entries()[0].first_seen, NOW);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn missing_primary_route_falls_back_once() {
    let path = temp_ledger();
    let cms = Arc::new(FakeCms::default().without_route("job_listing"));
    let source = Arc::new(FakeSource::new(vec![
        raw("Data Engineer", "Acme", "https://x.com/1"),
        raw("Backend Developer", "Beta", "https://x.com/2"),
    ]));

    let summary = orchestrator(&cms, &source, &path, settings()).run().await.unwrap();

    assert_eq!(summary.published, 2);
    assert_eq!(
        cms.state.lock().unwrap().creates,
        vec!["job_listing", "posts", "posts"]
    );
    // Read-back uses the resolved route
    assert_eq!(summary.recent.len(), 2);
    assert_eq!(summary.recent[0].title, "Backend Developer");

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn unreachable_remote_aborts_before_touching_ledger() {
    let path = temp_ledger();
    let cms = Arc::new(FakeCms::default());
    cms.state.lock().unwrap().unreachable = true;
    let source = Arc::new(FakeSource::new(vec![raw("Data Engineer", "Acme", "https://x.com/1")]));

    let result = orchestrator(&cms, &source, &path, settings()).run().await;

    assert!(matches!(result, Err(SyncError::RemoteUnreachable(_))));
    assert!(source.queries.lock().unwrap().is_empty());
    assert!(!path.exists());
}

#[tokio::test]
async fn failed_publish_is_retried_next_run() {
    let path = temp_ledger();
    let cms = Arc::new(FakeCms::default());
    cms.state.lock().unwrap().reject_creates = true;
    let source = Arc::new(FakeSource::new(vec![raw("Data Engineer", "Acme", "https://x.com/1")]));

    let failed = orchestrator(&cms, &source, &path, settings()).run().await.unwrap();
    assert_eq!(failed.failed, 1);
    assert!(!failed.ledger_saved);
    assert!(!path.exists());

    cms.state.lock().unwrap().reject_creates = false;
    let retried = orchestrator(&cms, &source, &path, settings()).run().await.unwrap();
    assert_eq!(retried.published, 1);
    assert_eq!(LedgerStore::new(path.clone()).load().await.len(), 1);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn listing_without_identity_is_rejected() {
    let path = temp_ledger();
    let cms = Arc::new(FakeCms::default());
    let source = Arc::new(FakeSource::new(vec![RawListing {
        company: Some("Acme".to_string()),
        ..Default::default()
    }]));

    let summary = orchestrator(&cms, &source, &path, settings()).run().await.unwrap();

    assert_eq!(summary.skipped_missing_fields, 1);
    let state = cms.state.lock().unwrap();
    assert_eq!(state.searches, 0);
    assert!(state.creates.is_empty());
}

#[tokio::test]
async fn unknown_region_makes_no_remote_calls() {
    let path = temp_ledger();
    let cms = Arc::new(FakeCms::default());
    let source = Arc::new(FakeSource::new(vec![raw("Data Engineer", "Acme", "https://x.com/1")]));
    let settings = RunSettings {
        process_region: Some("mars".to_string()),
        ..settings()
    };

    let summary = orchestrator(&cms, &source, &path, settings).run().await.unwrap();

    assert_eq!(summary.fetched, 0);
    assert_eq!(cms.state.lock().unwrap().pings, 0);
    assert!(source.queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn expired_entries_are_pruned_and_saved() {
    let path = temp_ledger();
    let store = LedgerStore::new(path.clone());
    let old = LedgerEntry {
        first_seen: NOW - 120 * DAY,
        ..LedgerEntry::legacy(ListingKey::ById("remotive:1".to_string()))
    };
    let recent = LedgerEntry {
        first_seen: NOW - DAY,
        ..LedgerEntry::legacy(ListingKey::ById("remotive:2".to_string()))
    };
    store
        .save(&Ledger::from_entries(vec![old, recent]))
        .await
        .unwrap();

    let cms = Arc::new(FakeCms::default());
    let source = Arc::new(FakeSource::new(Vec::new()));
    let summary = orchestrator(&cms, &source, &path, settings()).run().await.unwrap();

    assert_eq!(summary.pruned, 1);
    assert!(summary.ledger_saved);
    let ledger = store.load().await;
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.entries()[0].key, ListingKey::ById("remotive:2".to_string()));

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn ledger_save_failure_keeps_run_result() {
    // A directory at the ledger path makes the final rename fail
    let path = temp_ledger();
    std::fs::create_dir_all(&path).unwrap();
    let cms = Arc::new(FakeCms::default());
    let source = Arc::new(FakeSource::new(vec![raw("Data Engineer", "Acme", "https://x.com/1")]));

    let summary = orchestrator(&cms, &source, &path, settings()).run().await.unwrap();

    assert_eq!(summary.published, 1);
    assert_eq!(summary.ledger_entries, 1);
    assert!(!summary.ledger_saved);
    assert_eq!(cms.state.lock().unwrap().posts.len(), 1);
    assert!(path.is_dir());

    let _ = std::fs::remove_dir_all(&path);
}
