//! # Run Orchestrator
//!
//! Drives one sync run:
//!
//! 1. Select regions (explicit region, weekday rotation or all) and expand
//!    them into query axes
//! 2. Check that the CMS root answers; abort the run if not
//! 3. Load and prune the ledger
//! 4. For every axis, query each source, then push every fetched listing
//!    through admission, ledger dedup, logo fetch and publish
//! 5. Save the ledger if it changed and read back the most recent posts
//!
//! Everything is sequential and every remote call is followed by a pacing
//! pause. A failing candidate never stops the run.

use bridge_traits::publishing::PublishingEndpoint;
use bridge_traits::source::{RawListing, SourceConnector};
use bridge_traits::time::Clock;
use chrono::Datelike;
use core_ledger::{compute_key, is_acceptable, prune, Ledger, LedgerEntry, LedgerStore, NormalizedListing};
use core_publish::{LogoFetcher, PublishError, Publisher};
use core_runtime::config::{RegionConfig, RunConfig};
use core_runtime::Pacer;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use crate::axes::{expand, select_regions, QueryAxis, RegionFilter};
use crate::candidate::{Candidate, CandidateState};
use crate::error::{Result, SyncError};
use crate::summary::RunSummary;

/// Run-level settings taken from [`RunConfig`].
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub regions: Vec<RegionConfig>,
    pub auto_rotate: bool,
    pub process_region: Option<String>,
    /// Zero disables retention
    pub retention: Duration,
    pub pacing_base: Duration,
    /// Posts read back after the run
    pub recent_sample: usize,
}

impl RunSettings {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            regions: config.regions.clone(),
            auto_rotate: config.auto_rotate,
            process_region: config.process_region.clone(),
            retention: config.ledger.max_age(),
            pacing_base: config.pacing.base(),
            recent_sample: config.remote.recent_sample,
        }
    }
}

/// A source together with its per-query result limit.
pub struct SourceHandle {
    pub connector: Arc<dyn SourceConnector>,
    pub limit: usize,
}

pub struct RunOrchestrator {
    endpoint: Arc<dyn PublishingEndpoint>,
    publisher: Publisher,
    ledger_store: LedgerStore,
    sources: Vec<SourceHandle>,
    logo_fetcher: Option<LogoFetcher>,
    clock: Arc<dyn Clock>,
    settings: RunSettings,
}

impl RunOrchestrator {
    pub fn new(
        endpoint: Arc<dyn PublishingEndpoint>,
        publisher: Publisher,
        ledger_store: LedgerStore,
        clock: Arc<dyn Clock>,
        settings: RunSettings,
    ) -> Self {
        Self {
            endpoint,
            publisher,
            ledger_store,
            sources: Vec::new(),
            logo_fetcher: None,
            clock,
            settings,
        }
    }

    /// Add a source. Sources are queried in the order they were added.
    pub fn with_source(mut self, connector: Arc<dyn SourceConnector>, limit: usize) -> Self {
        self.sources.push(SourceHandle { connector, limit });
        self
    }

    pub fn with_logo_fetcher(mut self, fetcher: LogoFetcher) -> Self {
        self.logo_fetcher = Some(fetcher);
        self
    }

    pub fn ledger_store(&self) -> &LedgerStore {
        &self.ledger_store
    }

    /// Execute one run.
    ///
    /// # Errors
    ///
    /// Only an unreachable remote root is fatal; everything else is counted
    /// in the summary.
    #[instrument(skip(self), fields(ledger = %self.ledger_store.path().display()))]
    pub async fn run(&mut self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        let filter = RegionFilter::from_settings(
            self.settings.process_region.as_deref(),
            self.settings.auto_rotate,
            self.clock.now().weekday(),
        );
        let axes = expand(&select_regions(&self.settings.regions, &filter));
        if axes.is_empty() {
            warn!("No query axes selected, nothing to do");
            return Ok(summary);
        }

        self.endpoint
            .ping()
            .await
            .map_err(|e| SyncError::RemoteUnreachable(e.to_string()))?;
        info!(axes = axes.len(), sources = self.sources.len(), "Starting run");
        self.publisher.start_run();

        let loaded = self.ledger_store.load().await;
        let mut ledger = prune(&loaded, self.settings.retention, self.clock.unix_timestamp());
        summary.pruned = loaded.len() - ledger.len();
        let mut changed = summary.pruned > 0;

        for axis in &axes {
            changed |= self.run_axis(axis, &mut ledger, &mut summary).await;
        }

        summary.ledger_entries = ledger.len();
        if changed {
            match self.ledger_store.save(&ledger).await {
                Ok(()) => summary.ledger_saved = true,
                Err(e) => error!(
                    error = %e,
                    "Failed to save ledger; listings published in this run may be posted again"
                ),
            }
        } else {
            debug!("Ledger unchanged, not saving");
        }

        if self.settings.recent_sample > 0 {
            let route = self.publisher.routes().current_route().to_string();
            match self
                .endpoint
                .recent_posts(&route, self.settings.recent_sample)
                .await
            {
                Ok(posts) => summary.recent = posts,
                Err(e) => warn!(route = %route, error = %e, "Could not read back recent posts"),
            }
        }

        summary.log();
        Ok(summary)
    }

    /// Query every source for one axis and process the results. Returns
    /// whether the ledger changed.
    async fn run_axis(&mut self, axis: &QueryAxis, ledger: &mut Ledger, summary: &mut RunSummary) -> bool {
        let pacer = Pacer::new(axis.pause.unwrap_or(self.settings.pacing_base));
        self.publisher.set_pacer(pacer.clone());
        self.publisher.template_mut().set_axis_tags(axis.tags());

        let query = axis.to_query();
        info!(region = %axis.region_id, country = %axis.country_code, query = %query.text, "Searching");

        let mut fetched: Vec<(String, RawListing)> = Vec::new();
        for source in &self.sources {
            let listings = source.connector.fetch(&query, source.limit).await;
            pacer.pause("source_fetch").await;

            let name = source.connector.name();
            debug!(source = name, count = listings.len(), "Source returned listings");
            fetched.extend(listings.into_iter().map(|raw| (name.to_string(), raw)));
        }

        let mut changed = false;
        for (source, raw) in fetched {
            changed |= self
                .process_candidate(&source, &raw, ledger, summary, &pacer)
                .await;
        }
        changed
    }

    /// Push one listing through the pipeline. Returns whether the ledger
    /// gained an entry.
    async fn process_candidate(
        &mut self,
        source: &str,
        raw: &RawListing,
        ledger: &mut Ledger,
        summary: &mut RunSummary,
        pacer: &Pacer,
    ) -> bool {
        summary.fetched += 1;
        let mut candidate = Candidate::new(source);
        let listing = NormalizedListing::from_raw(raw);

        if !is_acceptable(&listing) {
            mark(&mut candidate, CandidateState::Rejected);
            summary.skipped_missing_fields += 1;
            debug!(source, "Skipping listing without title, URL or id");
            return false;
        }
        mark(&mut candidate, CandidateState::Admitted);

        let key = compute_key(&listing);
        candidate.key = Some(key.clone());
        if ledger.contains(&key) {
            mark(&mut candidate, CandidateState::Skipped);
            summary.skipped_duplicate += 1;
            debug!(source, key = %key, "Already in ledger");
            return false;
        }
        mark(&mut candidate, CandidateState::DedupChecked);

        let logo = match &self.logo_fetcher {
            Some(fetcher) => {
                let logo = fetcher.fetch(raw, &listing, &key).await;
                pacer.pause("logo_fetch").await;
                logo
            }
            None => None,
        };

        match self.publisher.publish(&listing, logo).await {
            Ok(remote) => {
                mark(&mut candidate, CandidateState::ReconcileChecked);
                mark(&mut candidate, CandidateState::Published);
                ledger.append(LedgerEntry::for_listing(
                    &listing,
                    key,
                    self.clock.unix_timestamp(),
                    Some(remote.id.to_string()),
                ));
                mark(&mut candidate, CandidateState::LedgerUpdated);
                summary.published += 1;
                true
            }
            Err(PublishError::AlreadyExists { remote_id }) => {
                mark(&mut candidate, CandidateState::SkippedUpdateLedger);
                info!(source, remote_id, title = %listing.title, "Already on remote, backfilling ledger");
                ledger.append(LedgerEntry::for_listing(
                    &listing,
                    key,
                    self.clock.unix_timestamp(),
                    None,
                ));
                summary.backfilled += 1;
                true
            }
            Err(PublishError::InvalidListing) => {
                mark(&mut candidate, CandidateState::Rejected);
                summary.skipped_missing_fields += 1;
                false
            }
            Err(e) => {
                mark(&mut candidate, CandidateState::ReconcileChecked);
                mark(&mut candidate, CandidateState::LoggedNotLedgered);
                warn!(source, title = %listing.title, error = %e, "Publish failed, will retry next run");
                summary.failed += 1;
                false
            }
        }
    }
}

fn mark(candidate: &mut Candidate, next: CandidateState) {
    match candidate.advance(next) {
        Ok(()) if next.is_terminal() => debug!(
            source = %candidate.source,
            key = ?candidate.key.as_ref().map(|k| k.short(12)),
            state = %next,
            "Candidate finished"
        ),
        Ok(()) => {}
        Err(e) => warn!(source = %candidate.source, error = %e, "Unexpected candidate transition"),
    }
}
