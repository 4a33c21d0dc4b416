//! Service façade and bootstrap helpers.
//!
//! This crate wires the host implementations (reqwest HTTP client, system
//! clock) and the configured providers into a ready-to-run
//! [`RunOrchestrator`]. The `jobsync` binary is a thin CLI over
//! [`SyncService`].

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_desktop::ReqwestHttpClient;
use bridge_traits::{
    http::HttpClient,
    publishing::PublishingEndpoint,
    retry::RetryPolicy,
    source::SourceConnector,
    time::{Clock, SystemClock},
};
use core_ledger::LedgerStore;
use core_publish::{LogoFetcher, PostTemplate, Publisher, Reconciler, RouteResolver};
use core_runtime::logging::redact_if_sensitive;
use core_runtime::RunConfig;
use core_sync::{RunOrchestrator, RunSettings, RunSummary};
use provider_job_boards::{build_connector, SourceKind};
use provider_wordpress::WordPressConnector;
use tracing::info;

/// Host-provided dependencies the core requires.
#[derive(Clone)]
pub struct CoreDependencies {
    pub http_client: Arc<dyn HttpClient>,
    pub clock: Arc<dyn Clock>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit handles.
    pub fn new(http_client: Arc<dyn HttpClient>, clock: Arc<dyn Clock>) -> Self {
        Self { http_client, clock }
    }

    /// Reqwest client with the configured timeout and user agent, system clock.
    pub fn desktop(config: &RunConfig) -> Result<Self> {
        let http = ReqwestHttpClient::with_options(config.remote.timeout(), &config.remote.user_agent)?;
        Ok(Self::new(Arc::new(http), Arc::new(SystemClock)))
    }
}

/// Enabled sources with their per-query limits, in configuration order.
///
/// Unknown kinds are a configuration error. JSearch without an API key is
/// skipped.
pub fn build_sources(
    config: &RunConfig,
    http_client: Arc<dyn HttpClient>,
    retry: &RetryPolicy,
) -> Result<Vec<(Arc<dyn SourceConnector>, usize)>> {
    let mut sources = Vec::new();
    for source in config.sources.iter().filter(|s| s.enabled) {
        let kind: SourceKind = source
            .kind
            .parse()
            .map_err(|_| CoreError::UnknownSource(source.kind.clone()))?;
        let connector = build_connector(
            kind,
            http_client.clone(),
            retry.clone(),
            config.jsearch_api_key.as_deref(),
        );
        if let Some(connector) = connector {
            sources.push((connector, source.limit.unwrap_or_else(|| kind.default_limit())));
        }
    }

    if sources.is_empty() {
        return Err(CoreError::InitializationFailed(
            "No usable source after applying configuration".to_string(),
        ));
    }
    Ok(sources)
}

/// Primary façade: one configured orchestrator, run on demand.
pub struct SyncService {
    orchestrator: RunOrchestrator,
}

impl SyncService {
    /// Wire everything from a validated configuration.
    pub fn new(config: &RunConfig, deps: CoreDependencies) -> Result<Self> {
        let retry = config.retry.to_policy();

        let endpoint: Arc<dyn PublishingEndpoint> = Arc::new(
            WordPressConnector::new(
                deps.http_client.clone(),
                config.remote.base_url.clone(),
                &config.remote.username,
                &config.remote.app_password,
            )
            .with_timeout(config.remote.timeout()),
        );

        let publisher = Publisher::new(
            endpoint.clone(),
            Reconciler::new(endpoint.clone(), config.remote.search_limit),
            RouteResolver::new(
                config.remote.primary_route.clone(),
                config.remote.fallback_route.clone(),
            ),
            PostTemplate::new(config.remote.post_status.clone(), config.remote.tags.clone()),
        )
        .with_retry(retry.clone());

        let mut orchestrator = RunOrchestrator::new(
            endpoint,
            publisher,
            LedgerStore::new(config.ledger.path.clone()),
            deps.clock.clone(),
            RunSettings::from_config(config),
        );

        for (connector, limit) in build_sources(config, deps.http_client.clone(), &retry)? {
            orchestrator = orchestrator.with_source(connector, limit);
        }

        if config.logo.enabled {
            orchestrator = orchestrator.with_logo_fetcher(LogoFetcher::new(
                deps.http_client.clone(),
                config.logo.service_url.clone(),
                config.logo.max_dimension,
            ));
        }

        info!(
            remote = %config.remote.base_url,
            username = %redact_if_sensitive("username", &config.remote.username),
            ledger = %config.ledger.path.display(),
            logos = config.logo.enabled,
            "Sync service ready"
        );
        Ok(Self { orchestrator })
    }

    /// Execute one sync run.
    pub async fn run_once(&mut self) -> Result<RunSummary> {
        Ok(self.orchestrator.run().await?)
    }
}
