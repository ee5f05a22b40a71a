//! Downloadable-document links

use crate::config::ExtractionConfig;
use crate::extract::text::{collapse_text, truncate_chars};
use crate::extract::types::{DocumentKind, ExtractedDocument};
use crate::url::resolve_href;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Block-level ancestors whose text is used as document context
const CONTEXT_CONTAINERS: &[&str] = &["div", "li", "td", "article"];

const UNKNOWN_TITLE: &str = "Unknown";

lazy_static! {
    static ref LINK_SELECTOR: Selector = Selector::parse("a[href]").unwrap();
}

/// Extracts every link whose target ends in a document suffix
///
/// # Field Rules
///
/// | Field | Source |
/// |-------|--------|
/// | url | href resolved against `base_url` |
/// | title | link text, else `title` attribute, else `"Unknown"` |
/// | context | text of the nearest `div`/`li`/`td`/`article` ancestor, bounded by `context_chars` |
///
/// Suffix matching is case-insensitive. Links whose href cannot be resolved
/// are skipped.
pub fn extract_documents(
    document: &Html,
    base_url: &Url,
    settings: &ExtractionConfig,
    extracted_at: DateTime<Utc>,
) -> Vec<ExtractedDocument> {
    let suffixes: Vec<String> = settings
        .document_suffixes
        .iter()
        .map(|s| s.trim().to_lowercase())
        .collect();

    let mut documents = Vec::new();

    for link in document.select(&LINK_SELECTOR) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };

        let lowered = href.trim().to_lowercase();
        if !suffixes.iter().any(|suffix| lowered.ends_with(suffix.as_str())) {
            continue;
        }

        let Some(url) = resolve_href(base_url, href) else {
            tracing::debug!("Skipping unresolvable document href: {}", href);
            continue;
        };

        documents.push(ExtractedDocument {
            title: link_title(&link),
            url: url.to_string(),
            context: link_context(&link, settings.context_chars),
            kind: DocumentKind::Pdf,
            extracted_at,
        });
    }

    documents
}

fn link_title(link: &ElementRef<'_>) -> String {
    let text = collapse_text(link);
    if !text.is_empty() {
        return text;
    }

    link.value()
        .attr("title")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(UNKNOWN_TITLE)
        .to_string()
}

fn link_context(link: &ElementRef<'_>, max_chars: usize) -> String {
    link.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| CONTEXT_CONTAINERS.contains(&el.value().name()))
        .map(|container| truncate_chars(&collapse_text(&container), max_chars))
        .unwrap_or_default()
}
