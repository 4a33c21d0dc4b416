//! Company logo enrichment.
//!
//! Logos come from the listing's own `logo_url` when a source provides one,
//! otherwise from a logo service keyed by company domain. Anything that is
//! not an image, or that fails to download, simply means "no logo".

use bridge_traits::http::{HttpClient, HttpRequest};
use bridge_traits::publishing::MediaUpload;
use bridge_traits::source::RawListing;
use bytes::Bytes;
use core_ledger::{ListingKey, NormalizedListing};
use image::{GenericImageView, ImageFormat};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::content::slugify;

/// Downloaded logo ready for upload.
#[derive(Debug, Clone)]
pub struct LogoAsset {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl LogoAsset {
    pub fn into_upload(self) -> MediaUpload {
        MediaUpload {
            filename: self.filename,
            content_type: self.content_type,
            bytes: self.bytes,
        }
    }
}

/// Company domain for the logo service.
///
/// `company_domain` wins over `company_website`; without either the slugified
/// company name plus `.com` is a best guess.
pub fn company_domain(raw: &RawListing, organization: &str) -> Option<String> {
    if let Some(domain) = raw.extra_str("company_domain") {
        return Some(domain.to_lowercase());
    }

    if let Some(host) = raw.extra_str("company_website").and_then(website_host) {
        return Some(host);
    }

    let compact = slugify(organization).replace('-', "");
    if compact.is_empty() {
        None
    } else {
        Some(format!("{}.com", compact))
    }
}

/// Host of a company website, without `www.`. Sources sometimes omit the
/// scheme, so a bare `acme.io/jobs` is read as https.
fn website_host(website: &str) -> Option<String> {
    let website = website.trim();
    let parsed = if website.contains("://") {
        Url::parse(website)
    } else {
        Url::parse(&format!("https://{}", website))
    }
    .ok()?;
    let host = parsed.host_str()?.trim_start_matches("www.");
    if host.is_empty() {
        None
    } else {
        Some(host.to_lowercase())
    }
}

fn extension_for(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/x-icon" | "image/vnd.microsoft.icon" => "ico",
        _ => "png",
    }
}

pub struct LogoFetcher {
    http_client: Arc<dyn HttpClient>,
    service_url: String,
    max_dimension: u32,
    timeout: Duration,
}

impl LogoFetcher {
    pub fn new(http_client: Arc<dyn HttpClient>, service_url: impl Into<String>, max_dimension: u32) -> Self {
        Self {
            http_client,
            service_url: service_url.into().trim_end_matches('/').to_string(),
            max_dimension: max_dimension.max(1),
            timeout: Duration::from_secs(15),
        }
    }

    fn logo_url(&self, raw: &RawListing, listing: &NormalizedListing) -> Option<String> {
        if let Some(url) = &listing.logo_url {
            return Some(url.clone());
        }
        company_domain(raw, &listing.organization).map(|domain| format!("{}/{}", self.service_url, domain))
    }

    /// Fetch a logo for the listing. Returns `None` on any failure.
    #[instrument(skip_all, fields(organization = %listing.organization))]
    pub async fn fetch(
        &self,
        raw: &RawListing,
        listing: &NormalizedListing,
        key: &ListingKey,
    ) -> Option<LogoAsset> {
        let url = self.logo_url(raw, listing)?;
        let response = match self
            .http_client
            .execute(HttpRequest::get(url.as_str()).timeout(self.timeout))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!(url = %url, error = %e, "Logo download failed");
                return None;
            }
        };

        let content_type = response.header("Content-Type").unwrap_or_default().to_string();
        if !response.is_success() || !content_type.contains("image") || response.body.is_empty() {
            debug!(url = %url, status = response.status, content_type = %content_type, "No usable logo");
            return None;
        }

        let (bytes, content_type) = self.downsize(response.body, &content_type)?;
        let mut stem = slugify(&listing.organization);
        if stem.is_empty() {
            stem = "logo".to_string();
        }
        let filename = format!("{}-{}.{}", stem, key.short(8), extension_for(&content_type));

        debug!(filename = %filename, size = bytes.len(), "Fetched logo");
        Some(LogoAsset {
            filename,
            content_type,
            bytes,
        })
    }

    /// Shrink oversized raster images to fit `max_dimension` square, as PNG.
    /// SVG passes through untouched; undecodable rasters are dropped.
    fn downsize(&self, bytes: Bytes, content_type: &str) -> Option<(Bytes, String)> {
        if extension_for(content_type) == "svg" {
            return Some((bytes, content_type.to_string()));
        }

        let decoded = match image::load_from_memory(&bytes) {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!(error = %e, "Logo is not a decodable image");
                return None;
            }
        };

        let (width, height) = decoded.dimensions();
        if width <= self.max_dimension && height <= self.max_dimension {
            return Some((bytes, content_type.to_string()));
        }

        let thumbnail = decoded.thumbnail(self.max_dimension, self.max_dimension);
        let mut encoded = Cursor::new(Vec::new());
        if let Err(e) = thumbnail.write_to(&mut encoded, ImageFormat::Png) {
            debug!(error = %e, "Could not re-encode logo");
            return None;
        }
        Some((Bytes::from(encoded.into_inner()), "image/png".to_string()))
    }
}
