//! HTML parser for fetched pages
//!
//! Turns a response body into a [`ParsedPage`]: the parsed document handed to
//! the extractors plus the page title recorded on the page result.

use lazy_static::lazy_static;
use scraper::{Html, Selector};

/// Title recorded for pages without a usable `<title>`
pub const NO_TITLE: &str = "No title";

lazy_static! {
    static ref TITLE_SELECTOR: Selector = Selector::parse("title").unwrap();
}

/// A parsed page body
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from the `<title>` tag), or [`NO_TITLE`]
    pub title: String,

    /// The parsed document
    pub document: Html,
}

/// Parses HTML content and extracts the page title
///
/// Parsing is lenient and never fails: malformed markup is repaired the way
/// a browser would repair it.
///
/// # Example
///
/// ```
/// use health_harvest::crawler::parse_html;
///
/// let html = r#"<html><head><title> NCDC </title></head><body></body></html>"#;
/// let parsed = parse_html(html);
/// assert_eq!(parsed.title, "NCDC");
/// ```
pub fn parse_html(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);
    let title = extract_title(&document).unwrap_or_else(|| NO_TITLE.to_string());

    ParsedPage { title, document }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}
