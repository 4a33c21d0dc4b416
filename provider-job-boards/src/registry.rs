//! Source lookup by configured kind.

use bridge_traits::http::HttpClient;
use bridge_traits::retry::RetryPolicy;
use bridge_traits::source::SourceConnector;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::arbeitnow::ArbeitnowConnector;
use crate::himalayas::HimalayasConnector;
use crate::jobicy::JobicyConnector;
use crate::jsearch::JSearchConnector;
use crate::remoteok::RemoteOkConnector;
use crate::remotive::RemotiveConnector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Remotive,
    RemoteOk,
    Arbeitnow,
    Jobicy,
    Himalayas,
    JSearch,
}

impl SourceKind {
    pub const ALL: [SourceKind; 6] = [
        SourceKind::JSearch,
        SourceKind::Remotive,
        SourceKind::RemoteOk,
        SourceKind::Arbeitnow,
        SourceKind::Jobicy,
        SourceKind::Himalayas,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Remotive => crate::remotive::NAME,
            SourceKind::RemoteOk => crate::remoteok::NAME,
            SourceKind::Arbeitnow => crate::arbeitnow::NAME,
            SourceKind::Jobicy => crate::jobicy::NAME,
            SourceKind::Himalayas => crate::himalayas::NAME,
            SourceKind::JSearch => crate::jsearch::NAME,
        }
    }

    /// Results requested per query when the config gives no limit.
    pub fn default_limit(&self) -> usize {
        match self {
            SourceKind::JSearch => 20,
            SourceKind::Remotive => 50,
            SourceKind::RemoteOk => 80,
            SourceKind::Arbeitnow => 50,
            SourceKind::Jobicy => 50,
            SourceKind::Himalayas => 40,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| format!("unknown source type '{}'", s))
    }
}

/// Build the connector for `kind`.
///
/// JSearch needs an API key; without one it is skipped and `None` returned.
pub fn build_connector(
    kind: SourceKind,
    http_client: Arc<dyn HttpClient>,
    retry: RetryPolicy,
    jsearch_api_key: Option<&str>,
) -> Option<Arc<dyn SourceConnector>> {
    let connector: Arc<dyn SourceConnector> = match kind {
        SourceKind::Remotive => Arc::new(RemotiveConnector::new(http_client, retry)),
        SourceKind::RemoteOk => Arc::new(RemoteOkConnector::new(http_client, retry)),
        SourceKind::Arbeitnow => Arc::new(ArbeitnowConnector::new(http_client, retry)),
        SourceKind::Jobicy => Arc::new(JobicyConnector::new(http_client, retry)),
        SourceKind::Himalayas => Arc::new(HimalayasConnector::new(http_client, retry)),
        SourceKind::JSearch => match jsearch_api_key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => Arc::new(JSearchConnector::new(http_client, retry, key)),
            None => {
                warn!("No JSearch API key configured, skipping jsearch source");
                return None;
            }
        },
    };

    info!(source = %kind, "Source enabled");
    Some(connector)
}
