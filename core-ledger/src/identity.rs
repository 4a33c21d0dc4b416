//! Listing identity.
//!
//! A listing is identified by its source-provided id when there is one, and
//! otherwise by a digest of its normalized `title | organization | locale`.

use bridge_traits::source::RawListing;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Locale used when a source does not say where a job is.
pub const DEFAULT_LOCALE: &str = "Remote";

const ID_PREFIX: &str = "id:";
const DIGEST_HEX_LEN: usize = 64;

/// Canonical listing shape the sync engine operates on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedListing {
    pub title: String,
    pub organization: String,
    /// Free-text location or "Remote"
    pub locale: String,
    pub description: String,
    pub apply_url: String,
    pub external_id: Option<String>,
    pub logo_url: Option<String>,
}

impl NormalizedListing {
    /// Normalize a raw source record. Missing text fields become empty
    /// strings and a missing location becomes [`DEFAULT_LOCALE`].
    pub fn from_raw(raw: &RawListing) -> Self {
        let text = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string()
        };
        let optional = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let locale = text(&raw.location);

        Self {
            title: text(&raw.title),
            organization: text(&raw.company),
            locale: if locale.is_empty() {
                DEFAULT_LOCALE.to_string()
            } else {
                locale
            },
            description: text(&raw.description),
            apply_url: text(&raw.url),
            external_id: optional(&raw.id),
            logo_url: optional(&raw.logo_url),
        }
    }
}

/// Derived identity of a listing.
///
/// The storage form (see [`fmt::Display`]) is `id:<external id>` for
/// [`ById`](ListingKey::ById), 64 lowercase hex characters for
/// [`ByComposite`](ListingKey::ByComposite), and the verbatim token for
/// [`Opaque`](ListingKey::Opaque). Parsing the storage form yields the same
/// key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListingKey {
    ById(String),
    ByComposite(String),
    /// Token from an older ledger format that fits neither shape
    Opaque(String),
}

impl ListingKey {
    /// Classify a key in storage form. Never fails: anything that is not an
    /// `id:` key or a digest is kept as an opaque token.
    pub fn from_stored(s: &str) -> Self {
        if let Some(id) = s.strip_prefix(ID_PREFIX) {
            if !id.is_empty() {
                return ListingKey::ById(id.to_string());
            }
        }
        if is_digest(s) {
            return ListingKey::ByComposite(s.to_string());
        }
        ListingKey::Opaque(s.to_string())
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, ListingKey::Opaque(_))
    }

    /// First `len` characters of the storage form, for file names and logs.
    pub fn short(&self, len: usize) -> String {
        let rendered = match self {
            ListingKey::ById(id) => id.as_str(),
            ListingKey::ByComposite(digest) | ListingKey::Opaque(digest) => digest.as_str(),
        };
        rendered.chars().take(len).collect()
    }
}

impl fmt::Display for ListingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingKey::ById(id) => write!(f, "{}{}", ID_PREFIX, id),
            ListingKey::ByComposite(digest) => f.write_str(digest),
            ListingKey::Opaque(token) => f.write_str(token),
        }
    }
}

impl FromStr for ListingKey {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ListingKey::from_stored(s))
    }
}

impl Serialize for ListingKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ListingKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ListingKey::from_stored(&raw))
    }
}

fn is_digest(s: &str) -> bool {
    s.len() == DIGEST_HEX_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Case-fold and collapse runs of whitespace.
fn normalize_part(part: &str) -> String {
    part.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Digest of the normalized `title | organization | locale` composite.
pub fn composite_key(title: &str, organization: &str, locale: &str) -> ListingKey {
    let composite = [title, organization, locale]
        .iter()
        .map(|part| normalize_part(part))
        .collect::<Vec<_>>()
        .join("|");

    let mut hasher = Sha256::new();
    hasher.update(composite.as_bytes());
    ListingKey::ByComposite(hex::encode(hasher.finalize()))
}

/// Derive the key of a listing. Deterministic and total.
pub fn compute_key(listing: &NormalizedListing) -> ListingKey {
    match listing.external_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => ListingKey::ById(id.to_string()),
        _ => composite_key(&listing.title, &listing.organization, &listing.locale),
    }
}

/// Admission gate: a listing needs a title, an apply URL or an external id.
pub fn is_acceptable(listing: &NormalizedListing) -> bool {
    let blank = |value: &str| value.trim().is_empty();
    !(blank(&listing.title)
        && blank(&listing.apply_url)
        && listing.external_id.as_deref().map_or(true, blank))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(title: &str, organization: &str, locale: &str) -> NormalizedListing {
        NormalizedListing {
            title: title.to_string(),
            organization: organization.to_string(),
            locale: locale.to_string(),
            apply_url: "https://x.com/1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_compute_key_is_deterministic() {
        let l = listing("Data Engineer", "Acme", "Remote");
        assert_eq!(compute_key(&l), compute_key(&l));
        assert_eq!(compute_key(&l), compute_key(&l.clone()));
    }

    #[test]
    fn test_external_id_takes_precedence() {
        let mut a = listing("Data Engineer", "Acme", "Remote");
        a.external_id = Some("remotive:42".to_string());
        let mut b = listing("Totally Different", "Other Co", "Berlin");
        b.external_id = Some("remotive:42".to_string());

        assert_eq!(compute_key(&a), ListingKey::ById("remotive:42".to_string()));
        assert_eq!(compute_key(&a), compute_key(&b));
    }

    #[test]
    fn test_blank_external_id_falls_back_to_composite() {
        let mut l = listing("Data Engineer", "Acme", "Remote");
        l.external_id = Some("   ".to_string());
        assert!(matches!(compute_key(&l), ListingKey::ByComposite(_)));
    }

    #[test]
    fn test_composite_ignores_case_and_whitespace() {
        let a = listing("Data Engineer", "Acme", "Remote");
        let b = listing("  data   ENGINEER ", "ACME", "remote");
        assert_eq!(compute_key(&a), compute_key(&b));

        let c = listing("Data Engineer", "Acme", "Berlin");
        assert_ne!(compute_key(&a), compute_key(&c));
    }

    #[test]
    fn test_composite_parts_do_not_bleed() {
        // Part boundaries survive normalization
        assert_ne!(
            composite_key("Data Engineer", "Acme Berlin", "Remote"),
            composite_key("Data Engineer Acme", "Berlin", "Remote")
        );
    }

    #[test]
    fn test_storage_form_round_trips() {
        let keys = [
            ListingKey::ById("remotive:42".to_string()),
            composite_key("Data Engineer", "Acme", "Remote"),
            ListingKey::Opaque("3f786850e387550fdab836ed7e6dc881de23001b".to_string()),
        ];
        for key in keys {
            let parsed: ListingKey = key.to_string().parse().unwrap();
            assert_eq!(parsed, key);
        }
    }

    #[test]
    fn test_parse_classifies_tokens() {
        assert_eq!(
            "id:123".parse::<ListingKey>().unwrap(),
            ListingKey::ById("123".to_string())
        );
        assert!("id:".parse::<ListingKey>().unwrap().is_opaque());
        assert!("ABCDEF".parse::<ListingKey>().unwrap().is_opaque());
        // Uppercase hex is not the storage form of a composite digest
        assert!("A".repeat(64).parse::<ListingKey>().unwrap().is_opaque());
    }

    #[test]
    fn test_is_acceptable() {
        assert!(is_acceptable(&listing("Data Engineer", "", "")));

        let only_url = NormalizedListing {
            apply_url: "https://x.com/1".to_string(),
            ..Default::default()
        };
        assert!(is_acceptable(&only_url));

        let only_id = NormalizedListing {
            external_id: Some("7".to_string()),
            ..Default::default()
        };
        assert!(is_acceptable(&only_id));

        let empty = NormalizedListing {
            organization: "Acme".to_string(),
            external_id: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(!is_acceptable(&empty));
    }

    #[test]
    fn test_from_raw_defaults_locale_and_trims() {
        let raw = RawListing {
            id: Some(" 99 ".to_string()),
            title: Some(" Data Engineer ".to_string()),
            company: Some("Acme".to_string()),
            location: Some("   ".to_string()),
            url: Some("https://x.com/1".to_string()),
            ..Default::default()
        };

        let normalized = NormalizedListing::from_raw(&raw);
        assert_eq!(normalized.title, "Data Engineer");
        assert_eq!(normalized.locale, DEFAULT_LOCALE);
        assert_eq!(normalized.external_id.as_deref(), Some("99"));
        assert_eq!(normalized.description, "");
        assert_eq!(normalized.logo_url, None);
    }

    #[test]
    fn test_short_key() {
        let key = composite_key("Data Engineer", "Acme", "Remote");
        assert_eq!(key.short(8).len(), 8);
        assert_eq!(ListingKey::ById("abc".to_string()).short(8), "abc");
    }
}
