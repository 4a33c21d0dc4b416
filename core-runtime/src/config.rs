//! # Run Configuration
//!
//! Configuration for a sync run: the remote CMS, the ledger file, pacing and
//! retry parameters, the query axes (regions × countries × locales) and the
//! enabled sources.
//!
//! ## Overview
//!
//! A [`RunConfig`] is either built programmatically with
//! [`RunConfig::builder()`] or loaded from a JSON file with
//! [`RunConfig::load`], which also overlays the process environment.
//! Both paths end in [`RunConfig::validate`]: a run never starts with a
//! configuration it cannot honour.
//!
//! ## Environment Overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `WP_URL` | `remote.base_url` |
//! | `WP_USERNAME` | `remote.username` |
//! | `WP_APP_PASSWORD` | `remote.app_password` |
//! | `JSEARCH_API_KEY` | `jsearch_api_key` |
//! | `PROCESS_REGION` | `process_region` |
//! | `AUTO_ROTATE` | `auto_rotate` (`1`, `true`, `yes` enable it) |
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{RunConfig, RegionConfig};
//!
//! let config = RunConfig::builder()
//!     .base_url("https://jobs.example.com")
//!     .credentials("editor", "abcd efgh ijkl")
//!     .ledger_path("posted_jobs.json")
//!     .region(RegionConfig::new("europe", "Europe").with_country(country))
//!     .source(SourceConfig::new("remotive"))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::retry::{Jitter, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const ENV_WP_URL: &str = "WP_URL";
pub const ENV_WP_USERNAME: &str = "WP_USERNAME";
pub const ENV_WP_APP_PASSWORD: &str = "WP_APP_PASSWORD";
pub const ENV_JSEARCH_API_KEY: &str = "JSEARCH_API_KEY";
pub const ENV_PROCESS_REGION: &str = "PROCESS_REGION";
pub const ENV_AUTO_ROTATE: &str = "AUTO_ROTATE";

const MAX_PACING_MS: u64 = 60_000;

/// Remote CMS (WordPress) settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Site root, e.g. `https://jobs.example.com`
    pub base_url: String,
    pub username: String,
    /// WordPress application password
    pub app_password: String,
    /// Specialized post type route tried first
    pub primary_route: String,
    /// Generic route used when the primary one does not exist
    pub fallback_route: String,
    /// Status for created posts (`draft`, `publish`, ...)
    pub post_status: String,
    /// Static tags rendered into every post
    pub tags: Vec<String>,
    /// Number of search results inspected by reconciliation
    pub search_limit: usize,
    /// Number of recent posts read back for the run summary
    pub recent_sample: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            app_password: String::new(),
            primary_route: "job_listing".to_string(),
            fallback_route: "posts".to_string(),
            post_status: "draft".to_string(),
            tags: Vec::new(),
            search_limit: 10,
            recent_sample: 5,
            timeout_secs: 20,
            user_agent: concat!("jobsync/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("app_password", &"[REDACTED]")
            .field("primary_route", &self.primary_route)
            .field("fallback_route", &self.fallback_route)
            .field("post_status", &self.post_status)
            .field("tags", &self.tags)
            .field("search_limit", &self.search_limit)
            .field("recent_sample", &self.recent_sample)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Ledger file and retention horizon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub path: PathBuf,
    /// Retention horizon in days; 0 disables pruning
    pub max_age_days: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("posted_jobs.json"),
            max_age_days: 0,
        }
    }
}

impl LedgerConfig {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_days.saturating_mul(86_400))
    }
}

/// Pause applied after every remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub base_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self { base_ms: 2_000 }
    }
}

impl PacingConfig {
    pub fn base(&self) -> Duration {
        Duration::from_millis(self.base_ms)
    }
}

/// Retry parameters for transient transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            use_exponential_backoff: true,
            jitter: if self.jitter {
                Jitter::UpToBase
            } else {
                Jitter::None
            },
        }
    }
}

/// One search within a country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleConfig {
    pub query: String,
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryConfig {
    #[serde(default)]
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub locales: Vec<LocaleConfig>,
}

/// A region (continent) groups countries and may override the pacing base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pause_ms: Option<u64>,
    #[serde(default)]
    pub countries: Vec<CountryConfig>,
}

impl RegionConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            pause_ms: None,
            countries: Vec::new(),
        }
    }

    pub fn with_country(mut self, country: CountryConfig) -> Self {
        self.countries.push(country);
        self
    }

    pub fn with_pause_ms(mut self, pause_ms: u64) -> Self {
        self.pause_ms = Some(pause_ms);
        self
    }

    pub fn locale_count(&self) -> usize {
        self.countries.iter().map(|c| c.locales.len()).sum()
    }
}

impl CountryConfig {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            locales: Vec::new(),
        }
    }

    pub fn with_locale(mut self, query: impl Into<String>, city: Option<&str>) -> Self {
        self.locales.push(LocaleConfig {
            query: query.into(),
            city: city.map(str::to_string),
        });
        self
    }
}

/// A configured listing source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source kind (`remotive`, `remoteok`, `arbeitnow`, `jobicy`,
    /// `himalayas`, `jsearch`)
    #[serde(alias = "type")]
    pub kind: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Per-query result cap; each source has its own default
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SourceConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            enabled: true,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Company logo enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoConfig {
    pub enabled: bool,
    /// Logo service prefix; the company domain is appended
    pub service_url: String,
    /// Longest edge of the uploaded thumbnail, in pixels
    pub max_dimension: u32,
}

impl Default for LogoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_url: "https://logo.clearbit.com".to_string(),
            max_dimension: 600,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Complete configuration of a sync run.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub remote: RemoteConfig,
    pub ledger: LedgerConfig,
    pub pacing: PacingConfig,
    pub retry: RetryConfig,
    pub logo: LogoConfig,
    pub regions: Vec<RegionConfig>,
    pub sources: Vec<SourceConfig>,
    /// Process only the region assigned to the current weekday
    pub auto_rotate: bool,
    /// Restrict the run to one region id
    pub process_region: Option<String>,
    pub jsearch_api_key: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            ledger: LedgerConfig::default(),
            pacing: PacingConfig::default(),
            retry: RetryConfig::default(),
            logo: LogoConfig::default(),
            regions: Vec::new(),
            sources: Vec::new(),
            auto_rotate: true,
            process_region: None,
            jsearch_api_key: None,
        }
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("remote", &self.remote)
            .field("ledger", &self.ledger)
            .field("pacing", &self.pacing)
            .field("retry", &self.retry)
            .field("logo", &self.logo)
            .field("regions", &self.regions.len())
            .field("sources", &self.sources)
            .field("auto_rotate", &self.auto_rotate)
            .field("process_region", &self.process_region)
            .field(
                "jsearch_api_key",
                &self.jsearch_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl RunConfig {
    /// Creates a new builder for constructing a `RunConfig`.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }

    /// Parse a JSON configuration file without validating it.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path`, overlay the process environment and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from an environment lookup. Blank values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(url) = get(ENV_WP_URL) {
            self.remote.base_url = url;
        }
        if let Some(username) = get(ENV_WP_USERNAME) {
            self.remote.username = username;
        }
        if let Some(password) = get(ENV_WP_APP_PASSWORD) {
            self.remote.app_password = password;
        }
        if let Some(key) = get(ENV_JSEARCH_API_KEY) {
            self.jsearch_api_key = Some(key);
        }
        if let Some(region) = get(ENV_PROCESS_REGION) {
            self.process_region = Some(region);
        }
        if let Some(flag) = get(ENV_AUTO_ROTATE) {
            self.auto_rotate = matches!(flag.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - The remote base URL is present, parses, uses http or https and names a host
    /// - Remote credentials and routes are present
    /// - The ledger path is not empty
    /// - At least one region with a locale and one enabled source exist
    /// - Retry and pacing values are within bounds
    pub fn validate(&self) -> Result<()> {
        let base_url = self.remote.base_url.trim();
        if base_url.is_empty() {
            return Err(Error::Config(format!(
                "Remote base URL is required. Set remote.base_url or {}.",
                ENV_WP_URL
            )));
        }
        if !is_http_url(base_url) {
            return Err(Error::Config(format!(
                "Remote base URL must be an http:// or https:// URL with a host (got '{}')",
                base_url
            )));
        }

        if self.remote.username.trim().is_empty() || self.remote.app_password.trim().is_empty() {
            return Err(Error::Config(format!(
                "Remote credentials are required. Set {} and {}.",
                ENV_WP_USERNAME, ENV_WP_APP_PASSWORD
            )));
        }

        if self.remote.primary_route.trim().is_empty()
            || self.remote.fallback_route.trim().is_empty()
        {
            return Err(Error::Config(
                "Both primary and fallback create routes must be set".to_string(),
            ));
        }

        if self.ledger.path.as_os_str().is_empty() {
            return Err(Error::Config("Ledger path cannot be empty".to_string()));
        }

        if self.regions.is_empty() {
            return Err(Error::Config(
                "At least one region must be configured".to_string(),
            ));
        }
        if self.regions.iter().all(|region| region.locale_count() == 0) {
            return Err(Error::Config(
                "At least one region must define a country with a locale".to_string(),
            ));
        }

        if !self.sources.iter().any(|source| source.enabled) {
            return Err(Error::Config(
                "At least one source must be enabled".to_string(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(Error::Config(
                "Retry attempts must be at least 1".to_string(),
            ));
        }

        if self.pacing.base_ms > MAX_PACING_MS
            || self
                .regions
                .iter()
                .any(|region| region.pause_ms.unwrap_or(0) > MAX_PACING_MS)
        {
            return Err(Error::Config(
                "Pacing base exceeds maximum of 60 seconds (60,000ms)".to_string(),
            ));
        }

        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https")
                && parsed.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}

/// Builder for constructing [`RunConfig`] instances.
///
/// Unset sections keep their defaults; [`build()`](RunConfigBuilder::build)
/// validates the result.
#[derive(Debug, Default)]
pub struct RunConfigBuilder {
    config: Option<RunConfig>,
}

impl RunConfigBuilder {
    fn config(&mut self) -> &mut RunConfig {
        self.config.get_or_insert_with(RunConfig::default)
    }

    /// Sets the remote site root.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config().remote.base_url = url.into();
        self
    }

    /// Sets the remote username and application password.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        let remote = &mut self.config().remote;
        remote.username = username.into();
        remote.app_password = password.into();
        self
    }

    /// Sets the primary and fallback create routes.
    pub fn routes(mut self, primary: impl Into<String>, fallback: impl Into<String>) -> Self {
        let remote = &mut self.config().remote;
        remote.primary_route = primary.into();
        remote.fallback_route = fallback.into();
        self
    }

    pub fn post_status(mut self, status: impl Into<String>) -> Self {
        self.config().remote.post_status = status.into();
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.config().remote.tags = tags;
        self
    }

    pub fn ledger_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config().ledger.path = path.into();
        self
    }

    /// Sets the retention horizon in days (0 disables pruning).
    pub fn retention_days(mut self, days: u64) -> Self {
        self.config().ledger.max_age_days = days;
        self
    }

    pub fn pacing_base_ms(mut self, base_ms: u64) -> Self {
        self.config().pacing.base_ms = base_ms;
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config().retry = retry;
        self
    }

    pub fn logo(mut self, logo: LogoConfig) -> Self {
        self.config().logo = logo;
        self
    }

    pub fn region(mut self, region: RegionConfig) -> Self {
        self.config().regions.push(region);
        self
    }

    pub fn source(mut self, source: SourceConfig) -> Self {
        self.config().sources.push(source);
        self
    }

    pub fn auto_rotate(mut self, enabled: bool) -> Self {
        self.config().auto_rotate = enabled;
        self
    }

    pub fn process_region(mut self, region: impl Into<String>) -> Self {
        self.config().process_region = Some(region.into());
        self
    }

    pub fn jsearch_api_key(mut self, key: impl Into<String>) -> Self {
        self.config().jsearch_api_key = Some(key.into());
        self
    }

    /// Builds the final `RunConfig` instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] with an actionable message when a required
    /// value is missing or a value is out of bounds.
    pub fn build(self) -> Result<RunConfig> {
        let config = self.config.ok_or_else(|| {
            Error::Config("Remote base URL is required. Use .base_url() to set it.".to_string())
        })?;

        config.validate()?;

        Ok(config)
    }
}
