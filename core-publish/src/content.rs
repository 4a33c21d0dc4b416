//! Post rendering and keyword classification.

use bridge_traits::publishing::PostDraft;
use core_ledger::NormalizedListing;

const MAX_SLUG_LEN: usize = 200;
const MAX_SKILLS: usize = 6;

// First matching bucket wins, in table order.
const SENIORITY_KEYWORDS: &[(&str, &[&str])] = &[
    ("senior", &["senior", "lead", "principal", "sr.", "staff"]),
    ("mid", &["mid", "experienced"]),
    ("junior", &["junior", "jr.", "entry", "associate", "graduate"]),
];

const ROLE_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "backend",
        &["backend", "backend engineer", "java", "golang", "python", "ruby", "node"],
    ),
    (
        "frontend",
        &["frontend", "react", "angular", "vue", "javascript", "css", "html"],
    ),
    ("fullstack", &["full stack", "full-stack", "fullstack"]),
    (
        "data",
        &["data", "data scientist", "data engineer", "ml", "machine learning"],
    ),
    (
        "devops",
        &["devops", "site reliability", "sre", "infrastructure", "ci/cd"],
    ),
    ("mobile", &["ios", "android", "mobile", "react native", "flutter"]),
    ("qa", &["qa", "quality assurance", "tester", "automation"]),
];

const REMOTE_KEYWORDS: &[&str] = &["remote", "work from home"];

/// Keyword-derived labels for a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub seniority: &'static str,
    pub role: &'static str,
    /// `remote` or `onsite`
    pub work_type: &'static str,
    pub skills: Vec<&'static str>,
}

/// Classify by substring search over the lower-cased title and description.
pub fn classify(listing: &NormalizedListing) -> Classification {
    let text = format!("{} {}", listing.title, listing.description).to_lowercase();

    let mut skills: Vec<&'static str> = Vec::new();
    for keyword in ROLE_KEYWORDS.iter().flat_map(|(_, keywords)| keywords.iter()) {
        if skills.len() == MAX_SKILLS {
            break;
        }
        if text.contains(keyword) && !skills.contains(keyword) {
            skills.push(*keyword);
        }
    }

    Classification {
        seniority: first_bucket(&text, SENIORITY_KEYWORDS, "unspecified"),
        role: first_bucket(&text, ROLE_KEYWORDS, "other"),
        work_type: if REMOTE_KEYWORDS.iter().any(|kw| text.contains(kw)) {
            "remote"
        } else {
            "onsite"
        },
        skills,
    }
}

fn first_bucket(
    text: &str,
    table: &[(&'static str, &[&'static str])],
    default: &'static str,
) -> &'static str {
    table
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| text.contains(kw)))
        .map(|(label, _)| *label)
        .unwrap_or(default)
}

/// Lower-case ASCII slug; runs of other characters become one dash.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Post status and tags applied to every rendered listing.
#[derive(Debug, Clone)]
pub struct PostTemplate {
    status: String,
    static_tags: Vec<String>,
    axis_tags: Vec<String>,
}

impl PostTemplate {
    pub fn new(status: impl Into<String>, static_tags: Vec<String>) -> Self {
        Self {
            status: status.into(),
            static_tags,
            axis_tags: Vec::new(),
        }
    }

    /// Tags describing the current query axis (`continent:europe`,
    /// `country:DE`). Replaces the previous axis tags.
    pub fn set_axis_tags(&mut self, tags: Vec<String>) {
        self.axis_tags = tags;
    }

    pub fn slug_for(listing: &NormalizedListing) -> String {
        let mut slug = slugify(&format!(
            "{}-{}-{}",
            listing.title, listing.organization, listing.locale
        ));
        slug.truncate(MAX_SLUG_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
        slug
    }

    fn tags_for(&self, classification: &Classification) -> Vec<String> {
        let mut tags: Vec<String> = self
            .static_tags
            .iter()
            .chain(self.axis_tags.iter())
            .cloned()
            .collect();
        for derived in [
            format!("role:{}", classification.role),
            format!("seniority:{}", classification.seniority),
            classification.work_type.to_string(),
        ] {
            if !tags.contains(&derived) {
                tags.push(derived);
            }
        }
        tags
    }

    pub fn render(&self, listing: &NormalizedListing, featured_media: Option<u64>) -> PostDraft {
        let classification = classify(listing);
        let mut content = format!(
            "<p><strong>Company:</strong> {}</p><p><strong>Location:</strong> {}</p>",
            escape_html(&listing.organization),
            escape_html(&listing.locale)
        );

        if !listing.apply_url.is_empty() {
            let url = escape_html(&listing.apply_url);
            content.push_str(&format!(
                "<p><strong>Apply:</strong> <a href=\"{url}\" target=\"_blank\" rel=\"noopener\">{url}</a></p>"
            ));
        }

        content.push_str(&format!(
            "<p><strong>Role:</strong> {} | <strong>Seniority:</strong> {} | <strong>Work type:</strong> {}</p>",
            classification.role, classification.seniority, classification.work_type
        ));
        if !classification.skills.is_empty() {
            content.push_str(&format!(
                "<p><strong>Skills:</strong> {}</p>",
                escape_html(&classification.skills.join(", "))
            ));
        }
        content.push_str(&format!(
            "<p><strong>Tags:</strong> {}</p>",
            escape_html(&self.tags_for(&classification).join(", "))
        ));

        content.push_str("<hr/>");
        content.push_str(&listing.description);

        PostDraft {
            title: listing.title.clone(),
            content,
            slug: Self::slug_for(listing),
            status: self.status.clone(),
            featured_media,
        }
    }
}
