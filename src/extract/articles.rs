//! Article-like content blocks
//!
//! Candidates come from an ordered list of independent selector rules. A
//! block matched by several rules is emitted once per matching rule: pages
//! are unstructured enough that a missed article costs more than a duplicate,
//! so overlap is kept rather than deduplicated here.

use crate::config::ExtractionConfig;
use crate::extract::text::{collapse_text, truncate_chars};
use crate::extract::types::ExtractedArticle;
use crate::url::resolve_href;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use url::Url;

const NO_TITLE: &str = "No title";

/// One candidate-producing rule
#[derive(Debug, Clone, Copy)]
pub struct ArticleRule {
    pub name: &'static str,
    pub selector: &'static str,
}

/// Rules in the order they are applied
pub const ARTICLE_RULES: &[ArticleRule] = &[
    ArticleRule {
        name: "article element",
        selector: "article",
    },
    ArticleRule {
        name: "post class",
        selector: ".post",
    },
    ArticleRule {
        name: "news-item class",
        selector: ".news-item",
    },
    ArticleRule {
        name: "publication class",
        selector: ".publication",
    },
    ArticleRule {
        name: "class contains article",
        selector: r#"[class*="article"]"#,
    },
    ArticleRule {
        name: "class contains post",
        selector: r#"[class*="post"]"#,
    },
];

lazy_static! {
    static ref RULE_SELECTORS: Vec<(&'static str, Selector)> = ARTICLE_RULES
        .iter()
        .map(|rule| (rule.name, Selector::parse(rule.selector).unwrap()))
        .collect();
    static ref HEADING_SELECTOR: Selector = Selector::parse("h1, h2, h3, h4").unwrap();
    static ref LINK_SELECTOR: Selector = Selector::parse("a[href]").unwrap();
    static ref DATE_SELECTOR: Selector =
        Selector::parse(r#"time, .date, [class*="date"]"#).unwrap();
}

/// Extracts article records from every block matched by [`ARTICLE_RULES`]
///
/// # Field Rules
///
/// | Field | Source |
/// |-------|--------|
/// | title | first `h1`–`h4` inside the block, else `"No title"` |
/// | url | first `a[href]` inside the block, resolved |
/// | date | text of the first `time`, `.date` or `[class*="date"]` element |
/// | summary | block text, bounded by `summary_chars` |
///
/// A candidate is kept only when its title is longer than
/// `min_article_title_len` characters.
pub fn extract_articles(
    document: &Html,
    base_url: &Url,
    settings: &ExtractionConfig,
    extracted_at: DateTime<Utc>,
) -> Vec<ExtractedArticle> {
    let mut articles = Vec::new();

    for (rule, selector) in RULE_SELECTORS.iter() {
        let mut kept = 0usize;
        for block in document.select(selector) {
            let candidate = build_candidate(&block, base_url, settings, extracted_at);
            if passes_title_filter(&candidate.title, settings.min_article_title_len) {
                articles.push(candidate);
                kept += 1;
            }
        }
        if kept > 0 {
            tracing::debug!("Article rule '{}' kept {} candidates", rule, kept);
        }
    }

    articles
}

/// Inclusion filter suppressing navigation noise caught by generic selectors
pub fn passes_title_filter(title: &str, min_len: usize) -> bool {
    !title.is_empty() && title.chars().count() > min_len
}

fn build_candidate(
    block: &ElementRef<'_>,
    base_url: &Url,
    settings: &ExtractionConfig,
    extracted_at: DateTime<Utc>,
) -> ExtractedArticle {
    let title = block
        .select(&HEADING_SELECTOR)
        .next()
        .map(|heading| collapse_text(&heading))
        .unwrap_or_else(|| NO_TITLE.to_string());

    let url = block
        .select(&LINK_SELECTOR)
        .next()
        .and_then(|link| link.value().attr("href"))
        .and_then(|href| resolve_href(base_url, href))
        .map(|url| url.to_string());

    let date = block
        .select(&DATE_SELECTOR)
        .next()
        .map(|el| collapse_text(&el));

    let summary = truncate_chars(&collapse_text(block), settings.summary_chars);

    ExtractedArticle {
        title,
        url,
        date,
        summary,
        extracted_at,
    }
}
