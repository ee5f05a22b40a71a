//! Extraction engine
//!
//! Four independent, stateless extractors over a parsed document and the
//! URL it came from:
//! - documents: links to downloadable files
//! - articles: article-like content blocks
//! - tables: HTML tables as ordered row records
//! - contacts: email addresses and phone numbers
//!
//! None of them touch the network or filesystem, and none of them fail: a
//! page without the expected structure just yields empty results.

mod articles;
mod contacts;
mod documents;
mod tables;
mod text;
mod types;

pub use articles::{extract_articles, passes_title_filter, ArticleRule, ARTICLE_RULES};
pub use contacts::{contacts_in_text, extract_contacts};
pub use documents::extract_documents;
pub use tables::{cell_value, extract_tables, parse_table, TableError};
pub use text::{collapse_text, truncate_chars, visible_text};
pub use types::{
    ContactInfo, DocumentKind, ExtractedArticle, ExtractedDocument, ExtractedTable, TableKind,
    TableRow,
};

use crate::config::ExtractionConfig;
use chrono::{DateTime, Utc};
use scraper::Html;
use url::Url;

/// Everything the extractors found on one page
#[derive(Debug, Clone, Default)]
pub struct PageExtraction {
    pub documents: Vec<ExtractedDocument>,
    pub articles: Vec<ExtractedArticle>,
    pub tables: Vec<ExtractedTable>,
    pub contacts: ContactInfo,
}

/// Runs all four extractors with a shared timestamp
///
/// # Example
///
/// ```
/// use health_harvest::config::ExtractionConfig;
/// use health_harvest::extract::extract_page;
/// use scraper::Html;
/// use url::Url;
///
/// let html = Html::parse_document(
///     r#"<p>Write to info@health.gov.ng</p><a href="/a.pdf">Plan</a>"#,
/// );
/// let base = Url::parse("https://www.health.gov.ng/").unwrap();
/// let found = extract_page(&html, &base, &ExtractionConfig::default());
/// assert_eq!(found.documents.len(), 1);
/// assert!(found.contacts.emails.contains("info@health.gov.ng"));
/// ```
pub fn extract_page(
    document: &Html,
    base_url: &Url,
    settings: &ExtractionConfig,
) -> PageExtraction {
    let extracted_at = Utc::now();
    extract_page_at(document, base_url, settings, extracted_at)
}

/// Same as [`extract_page`] with an explicit extraction timestamp
pub fn extract_page_at(
    document: &Html,
    base_url: &Url,
    settings: &ExtractionConfig,
    extracted_at: DateTime<Utc>,
) -> PageExtraction {
    PageExtraction {
        documents: extract_documents(document, base_url, settings, extracted_at),
        articles: extract_articles(document, base_url, settings, extracted_at),
        tables: extract_tables(document, extracted_at),
        contacts: extract_contacts(document),
    }
}
