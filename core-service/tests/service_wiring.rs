use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::time::FixedClock;
use bytes::Bytes;
use core_ledger::LedgerStore;
use core_runtime::config::{CountryConfig, LogoConfig, RegionConfig, SourceConfig};
use core_runtime::RunConfig;
use core_service::{build_sources, CoreDependencies, CoreError, SyncService};
use core_sync::SyncError;
use mockall::mock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

mock! {
    HttpClient {}

    #[async_trait]
    impl HttpClient for HttpClient {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
    }
}

fn response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: HashMap::new(),
        body: Bytes::from(body.to_string()),
    }
}

/// Minimal WordPress site plus a Remotive feed, routed by URL.
#[derive(Default)]
struct FakeWeb {
    down: bool,
    requests: Mutex<Vec<(HttpMethod, String)>>,
}

#[async_trait]
impl HttpClient for FakeWeb {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((request.method, request.url.clone()));
        if self.down {
            return Err(BridgeError::Transport("connection refused".to_string()));
        }

        let url = request.url.as_str();
        let post = r#"{"id":5,"link":"https://jobs.example.com/?p=5","title":{"rendered":"Data Engineer"},"type":"job_listing"}"#;
        Ok(match request.method {
            _ if url == "https://jobs.example.com/wp-json/" => response(200, "{}"),
            _ if url.starts_with("https://jobs.example.com/wp-json/wp/v2/search?") => response(200, "[]"),
            HttpMethod::Post if url == "https://jobs.example.com/wp-json/wp/v2/job_listing" => {
                response(201, post)
            }
            HttpMethod::Get if url.starts_with("https://jobs.example.com/wp-json/wp/v2/job_listing?") => {
                response(200, &format!("[{}]", post))
            }
            _ if url.starts_with("https://remotive.com/api/remote-jobs") => response(
                200,
                r#"{"jobs":[{"id":1,"title":"Data Engineer","company_name":"Acme","url":"https://remotive.com/1"}]}"#,
            ),
            _ => response(404, r#"{"code":"rest_no_route"}"#),
        })
    }
}

fn temp_ledger() -> PathBuf {
    std::env::temp_dir().join(format!("jobsync-service-{}.json", uuid::Uuid::new_v4()))
}

fn config(ledger: &Path) -> RunConfig {
    RunConfig::builder()
        .base_url("https://jobs.example.com")
        .credentials("editor", "abcd efgh")
        .ledger_path(ledger)
        .pacing_base_ms(0)
        .logo(LogoConfig {
            enabled: false,
            ..Default::default()
        })
        .auto_rotate(false)
        .region(RegionConfig::new("europe", "Europe").with_country(
            CountryConfig::new("DE", "Germany").with_locale("data engineer", None),
        ))
        .source(SourceConfig::new("remotive"))
        .build()
        .unwrap()
}

#[test]
fn sources_follow_configuration() {
    let path = temp_ledger();
    let mut config = config(&path);
    config.sources = vec![
        SourceConfig::new("remotive").with_limit(5),
        SourceConfig::new("remoteok").disabled(),
        SourceConfig::new("jsearch"),
        SourceConfig::new("himalayas"),
    ];
    let http: Arc<dyn HttpClient> = Arc::new(MockHttpClient::new());

    let sources = build_sources(&config, http.clone(), &config.retry.to_policy()).unwrap();
    let built: Vec<_> = sources
        .iter()
        .map(|(connector, limit)| (connector.name().to_string(), *limit))
        .collect();
    assert_eq!(
        built,
        vec![("remotive".to_string(), 5), ("himalayas".to_string(), 40)]
    );

    config.sources.push(SourceConfig::new("linkedin"));
    let err = build_sources(&config, http, &config.retry.to_policy()).err().unwrap();
    assert!(matches!(err, CoreError::UnknownSource(kind) if kind == "linkedin"));
}

#[tokio::test]
async fn run_publishes_through_wordpress() {
    let path = temp_ledger();
    let web = Arc::new(FakeWeb::default());
    let deps = CoreDependencies::new(web.clone(), Arc::new(FixedClock::at_unix(1_760_000_000)));

    let mut service = SyncService::new(&config(&path), deps).unwrap();
    let summary = service.run_once().await.unwrap();

    assert_eq!(summary.published, 1);
    assert_eq!(summary.recent.len(), 1);
    assert_eq!(summary.recent[0].title, "Data Engineer");

    let ledger = LedgerStore::new(path.clone()).load().await;
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.entries()[0].remote_post_ref.as_deref(), Some("5"));

    let requests = web.requests.lock().unwrap();
    let creates = requests
        .iter()
        .filter(|(method, _)| *method == HttpMethod::Post)
        .count();
    assert_eq!(creates, 1);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn unreachable_site_fails_the_run() {
    let path = temp_ledger();
    let web = Arc::new(FakeWeb {
        down: true,
        ..Default::default()
    });
    let deps = CoreDependencies::new(web.clone(), Arc::new(FixedClock::at_unix(1_760_000_000)));

    let mut service = SyncService::new(&config(&path), deps).unwrap();
    let result = service.run_once().await;

    assert!(matches!(
        result,
        Err(CoreError::Sync(SyncError::RemoteUnreachable(_)))
    ));
    // Only the root ping was attempted
    assert_eq!(web.requests.lock().unwrap().len(), 1);
    assert!(!path.exists());
}
