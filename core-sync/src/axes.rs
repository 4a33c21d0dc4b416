//! Query axes: which (region, country, locale) combinations a run searches.

use bridge_traits::source::SourceQuery;
use chrono::Weekday;
use core_runtime::config::RegionConfig;
use std::time::Duration;
use tracing::{info, warn};

/// Region searched on each weekday when auto-rotation is on.
pub fn rotation_region(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "asia",
        Weekday::Tue => "europe",
        Weekday::Wed => "north_america",
        Weekday::Thu => "south_america",
        Weekday::Fri => "africa",
        Weekday::Sat => "oceania",
        Weekday::Sun => "antarctica",
    }
}

/// How regions are picked for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionFilter {
    All,
    /// Only the named region (id or name, case-insensitive)
    Named(String),
    /// The weekday's rotation region, or the first region if absent
    Rotate(Weekday),
}

impl RegionFilter {
    /// An explicit region wins over rotation.
    pub fn from_settings(process_region: Option<&str>, auto_rotate: bool, weekday: Weekday) -> Self {
        match process_region.map(str::trim).filter(|r| !r.is_empty()) {
            Some(region) => RegionFilter::Named(region.to_string()),
            None if auto_rotate => RegionFilter::Rotate(weekday),
            None => RegionFilter::All,
        }
    }
}

/// Regions selected by `filter`. Empty when a named region does not exist.
pub fn select_regions<'a>(regions: &'a [RegionConfig], filter: &RegionFilter) -> Vec<&'a RegionConfig> {
    let matches = |region: &RegionConfig, wanted: &str| {
        region.id.eq_ignore_ascii_case(wanted) || region.name.eq_ignore_ascii_case(wanted)
    };

    match filter {
        RegionFilter::All => regions.iter().collect(),
        RegionFilter::Named(wanted) => {
            let selected: Vec<_> = regions.iter().filter(|r| matches(r, wanted)).collect();
            if selected.is_empty() {
                warn!(region = %wanted, "No configured region matches the requested region");
            } else {
                info!(region = %wanted, "Processing requested region only");
            }
            selected
        }
        RegionFilter::Rotate(weekday) => {
            let wanted = rotation_region(*weekday);
            match regions.iter().find(|r| matches(r, wanted)) {
                Some(region) => {
                    info!(region = %region.id, weekday = %weekday, "Auto-rotation picked region");
                    vec![region]
                }
                None => {
                    let first = regions.first();
                    if let Some(region) = first {
                        info!(wanted, fallback = %region.id, "Rotation region not configured, using first region");
                    }
                    first.into_iter().collect()
                }
            }
        }
    }
}

/// One query along the configured axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryAxis {
    pub region_id: String,
    pub region_name: String,
    pub country_code: String,
    pub country_name: String,
    pub query: String,
    pub city: Option<String>,
    /// Region-specific pacing base
    pub pause: Option<Duration>,
}

impl QueryAxis {
    /// `query city country`, skipping blanks.
    pub fn text(&self) -> String {
        [
            Some(self.query.as_str()),
            self.city.as_deref(),
            Some(self.country_name.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// City, else country name.
    pub fn location(&self) -> Option<&str> {
        self.city
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .or(Some(self.country_name.as_str()).filter(|c| !c.trim().is_empty()))
    }

    pub fn to_query(&self) -> SourceQuery {
        let query = SourceQuery::new(self.text());
        match self.location() {
            Some(location) => query.with_location(location),
            None => query,
        }
    }

    /// Tags placed on posts found through this axis.
    pub fn tags(&self) -> Vec<String> {
        let mut tags = vec![format!("continent:{}", self.region_id)];
        if !self.country_code.trim().is_empty() {
            tags.push(format!("country:{}", self.country_code));
        }
        tags
    }
}

/// Flatten regions into axes, in configuration order.
pub fn expand(regions: &[&RegionConfig]) -> Vec<QueryAxis> {
    let mut axes = Vec::new();
    for region in regions {
        for country in &region.countries {
            for locale in &country.locales {
                axes.push(QueryAxis {
                    region_id: region.id.clone(),
                    region_name: region.name.clone(),
                    country_code: country.code.clone(),
                    country_name: country.name.clone(),
                    query: locale.query.clone(),
                    city: locale.city.clone(),
                    pause: region.pause_ms.map(Duration::from_millis),
                });
            }
        }
    }
    axes
}
