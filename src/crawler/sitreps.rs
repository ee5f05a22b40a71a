//! Disease situation-report pass
//!
//! Runs once after the main crawl: fetches a single listing page through the
//! shared [`FetchPolicy`] and keeps every link that looks like a report.

use crate::config::SitrepConfig;
use crate::crawler::fetcher::{FetchOutcome, FetchPolicy};
use crate::crawler::parser::parse_html;
use crate::extract::{collapse_text, DocumentKind, ExtractedDocument};
use crate::url::{parse_base_url, resolve_href};
use crate::HarvestError;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use scraper::{Html, Selector};
use url::Url;

const UNKNOWN_TITLE: &str = "Unknown";

lazy_static! {
    static ref LINK_SELECTOR: Selector = Selector::parse("a[href]").unwrap();
}

/// Fetches the listing page and extracts report links
///
/// The listing page is not checked against robots.txt and is not recorded in
/// the visited set; its request is still counted. A failed fetch yields no
/// reports rather than an error.
pub async fn scrape_sitreps(
    policy: &FetchPolicy,
    settings: &SitrepConfig,
) -> Result<Vec<ExtractedDocument>, HarvestError> {
    tracing::info!("Running situation report pass on {}", settings.url);

    let url = parse_base_url(&settings.url)?;
    let result = policy.fetch(&url).await;

    let page = match result.outcome {
        FetchOutcome::Success(page) => page,
        FetchOutcome::Failure(reason) => {
            tracing::warn!("Situation report page unavailable: {}", reason);
            return Ok(Vec::new());
        }
    };

    let parsed = parse_html(&page.text());
    let reports = extract_sitrep_links(&parsed.document, &url, &settings.keywords, Utc::now());

    tracing::info!("Found {} situation reports", reports.len());
    Ok(reports)
}

/// Selects links whose lower-cased href contains a keyword or `.pdf`
pub fn extract_sitrep_links(
    document: &Html,
    base_url: &Url,
    keywords: &[String],
    extracted_at: DateTime<Utc>,
) -> Vec<ExtractedDocument> {
    let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

    document
        .select(&LINK_SELECTOR)
        .filter_map(|link| {
            let href = link.value().attr("href")?;
            let lowered = href.to_lowercase();
            let is_report = lowered.contains(".pdf")
                || keywords
                    .iter()
                    .any(|k| !k.is_empty() && lowered.contains(k.as_str()));
            if !is_report {
                return None;
            }

            let url = resolve_href(base_url, href)?;
            let text = collapse_text(&link);
            Some(ExtractedDocument {
                title: if text.is_empty() {
                    UNKNOWN_TITLE.to_string()
                } else {
                    text
                },
                url: url.to_string(),
                context: String::new(),
                kind: DocumentKind::DiseaseReport,
                extracted_at,
            })
        })
        .collect()
}
