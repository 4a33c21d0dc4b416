//! Ledger file persistence.
//!
//! The file is a JSON array. Elements are either bare strings (legacy
//! format, key only) or objects:
//!
//! ```json
//! {"key": "id:remotive:42", "title": "Data Engineer", "company": "Acme",
//!  "location": "Remote", "url": "https://x.com/1", "first_seen": 1700000000,
//!  "remote_post_ref": "118"}
//! ```
//!
//! Older files call the key `hash`. Loading never fails the run: a missing
//! file is an empty ledger, a corrupt one is logged and treated as empty.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::error::{LedgerError, Result};
use crate::identity::{composite_key, ListingKey};
use crate::ledger::{Ledger, LedgerEntry};

/// On-disk shape of a structured entry.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    #[serde(default, alias = "hash", skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    first_seen: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    remote_post_ref: Option<String>,
}

impl StoredEntry {
    fn into_entry(self) -> LedgerEntry {
        let title = self.title.unwrap_or_default();
        let organization = self.company.unwrap_or_default();
        let locale = self.location.unwrap_or_default();
        let key = match self.key.as_deref().map(str::trim) {
            Some(stored) if !stored.is_empty() => ListingKey::from_stored(stored),
            _ => composite_key(&title, &organization, &locale),
        };

        LedgerEntry {
            key,
            title,
            organization,
            locale,
            apply_url: self.url.unwrap_or_default(),
            first_seen: self.first_seen,
            remote_post_ref: self.remote_post_ref,
        }
    }

    fn from_entry(entry: &LedgerEntry) -> Self {
        Self {
            key: Some(entry.key.to_string()),
            title: Some(entry.title.clone()),
            company: Some(entry.organization.clone()),
            location: Some(entry.locale.clone()),
            url: Some(entry.apply_url.clone()),
            first_seen: entry.first_seen,
            remote_post_ref: entry.remote_post_ref.clone(),
        }
    }
}

/// Accepts integers, floats, numeric strings and null; anything that cannot
/// be read as seconds is rejected.
fn lenient_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| D::Error::custom("first_seen out of range")),
        Value::String(s) if s.trim().is_empty() => Ok(0),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(|f| f as i64)
            .map_err(|_| D::Error::custom(format!("invalid first_seen '{}'", s))),
        other => Err(D::Error::custom(format!("invalid first_seen {}", other))),
    }
}

/// Upgrade a parsed ledger document into entries.
fn entries_from_document(document: Value) -> Vec<LedgerEntry> {
    let Value::Array(items) = document else {
        warn!("Unexpected ledger format; expected a list, starting fresh");
        return Vec::new();
    };

    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match item {
            Value::String(token) => match token.trim() {
                "" => warn!(index, "Skipping blank ledger key"),
                token => entries.push(LedgerEntry::legacy(ListingKey::from_stored(token))),
            },
            Value::Object(_) => match serde_json::from_value::<StoredEntry>(item) {
                Ok(stored) => entries.push(stored.into_entry()),
                Err(e) => warn!(index, error = %e, "Skipping malformed ledger entry"),
            },
            other => {
                warn!(index, kind = value_kind(&other), "Skipping unknown ledger entry shape");
            }
        }
    }
    entries
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Reads and writes the ledger file at a fixed path.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file used for write-then-rename.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("ledger"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Load the ledger. Missing or unreadable files yield an empty ledger.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Ledger {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No ledger file yet, starting empty");
                return Ledger::new();
            }
            Err(e) => {
                warn!(error = %e, "Could not read ledger file, starting fresh");
                return Ledger::new();
            }
        };

        let document: Value = match serde_json::from_slice(&raw) {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "Ledger file is corrupt, starting fresh");
                return Ledger::new();
            }
        };

        let ledger = Ledger::from_entries(entries_from_document(document));
        info!(entries = ledger.len(), "Loaded ledger");
        ledger
    }

    /// Overwrite the ledger file with the full ledger.
    ///
    /// Writes a sibling temp file and renames it over the target, so a
    /// crash mid-write leaves the previous file intact.
    #[instrument(skip(self, ledger), fields(path = %self.path.display(), entries = ledger.len()))]
    pub async fn save(&self, ledger: &Ledger) -> Result<()> {
        let stored: Vec<StoredEntry> = ledger.iter().map(StoredEntry::from_entry).collect();
        let body = serde_json::to_vec_pretty(&stored)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| LedgerError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, &body)
            .await
            .map_err(|source| LedgerError::Io {
                path: temp_path.clone(),
                source,
            })?;

        if let Err(source) = tokio::fs::rename(&temp_path, &self.path).await {
            if let Err(e) = tokio::fs::remove_file(&temp_path).await {
                debug!(temp = %temp_path.display(), error = %e, "Could not remove temp ledger file");
            }
            return Err(LedgerError::Io {
                path: self.path.clone(),
                source,
            });
        }

        debug!("Saved ledger");
        Ok(())
    }
}
