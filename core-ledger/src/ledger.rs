//! In-memory ledger of handled listings.

use crate::identity::{ListingKey, NormalizedListing};

/// One handled listing.
///
/// Entries are created on first successful publish or on reconciliation
/// backfill, never edited afterwards, and removed only by retention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub key: ListingKey,
    pub title: String,
    pub organization: String,
    pub locale: String,
    pub apply_url: String,
    /// Unix seconds; 0 means unknown
    pub first_seen: i64,
    /// Remote post id, absent for backfilled entries
    pub remote_post_ref: Option<String>,
}

impl LedgerEntry {
    pub fn for_listing(
        listing: &NormalizedListing,
        key: ListingKey,
        first_seen: i64,
        remote_post_ref: Option<String>,
    ) -> Self {
        Self {
            key,
            title: listing.title.clone(),
            organization: listing.organization.clone(),
            locale: listing.locale.clone(),
            apply_url: listing.apply_url.clone(),
            first_seen,
            remote_post_ref,
        }
    }

    /// Entry upgraded from a bare legacy token: key only, age unknown.
    pub fn legacy(key: ListingKey) -> Self {
        Self {
            key,
            title: String::new(),
            organization: String::new(),
            locale: String::new(),
            apply_url: String::new(),
            first_seen: 0,
            remote_post_ref: None,
        }
    }
}

/// Ordered collection of ledger entries.
///
/// Keys are not unique by construction; lookups succeed if any entry
/// carries the key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<LedgerEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LedgerEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter()
    }

    /// True iff any entry has this key.
    pub fn contains(&self, key: &ListingKey) -> bool {
        self.entries.iter().any(|entry| &entry.key == key)
    }

    /// First entry with this key.
    pub fn find(&self, key: &ListingKey) -> Option<&LedgerEntry> {
        self.entries.iter().find(|entry| &entry.key == key)
    }

    /// Add an entry. Duplicates are not filtered.
    pub fn append(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }
}

impl FromIterator<LedgerEntry> for Ledger {
    fn from_iter<I: IntoIterator<Item = LedgerEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
