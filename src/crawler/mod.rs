//! Crawler module for polite page fetching and run coordination
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with pacing, retry logic and the robots.txt gate
//! - HTML parsing of fetched pages
//! - The situation-report pass
//! - Overall run coordination

mod coordinator;
mod fetcher;
mod parser;
mod sitreps;

pub use coordinator::{plan_sources, run_harvest, Coordinator, SourcePlan};
pub use fetcher::{
    build_http_client, rate_limit_backoff, FetchFailure, FetchOutcome, FetchPolicy, FetchResult,
    FetchedPage, MAX_REDIRECTS,
};
pub use parser::{parse_html, ParsedPage, NO_TITLE};
pub use sitreps::{extract_sitrep_links, scrape_sitreps};
