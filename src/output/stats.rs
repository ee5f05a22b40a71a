//! Run statistics
//!
//! This module computes the end-of-run summary from the aggregate result
//! set and the run context, and reports it through the log.

use crate::output::traits::RunResult;
use crate::state::RunContext;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Source and page counters maintained by the crawl driver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    /// Sources configured for the run
    pub sources_total: u64,

    /// Sources skipped because robots.txt disallowed the base URL
    pub sources_blocked: u64,

    /// Sources abandoned because of an error
    pub sources_failed: u64,

    /// Pages that produced a page result
    pub pages_scraped: u64,
}

/// Summary statistics for a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub scrape_date: DateTime<Utc>,
    pub config_hash: String,
    pub sources_total: u64,
    pub sources_blocked: u64,
    pub sources_failed: u64,
    pub pages_scraped: u64,
    pub total_urls_visited: u64,
    pub total_requests: u64,
    pub documents_found: u64,
    pub articles_found: u64,
    pub tables_found: u64,
    pub unique_emails: u64,
    pub unique_phones: u64,
}

impl RunSummary {
    /// Computes the summary of a finished run
    pub fn from_run(result: &RunResult, context: &RunContext, tally: &RunTally) -> Self {
        Self {
            scrape_date: Utc::now(),
            config_hash: context.config_hash().to_string(),
            sources_total: tally.sources_total,
            sources_blocked: tally.sources_blocked,
            sources_failed: tally.sources_failed,
            pages_scraped: tally.pages_scraped,
            total_urls_visited: result.visited.len() as u64,
            total_requests: context.requests(),
            documents_found: result.documents.len() as u64,
            articles_found: result.articles.len() as u64,
            tables_found: result.tables.len() as u64,
            unique_emails: result.unique_emails().len() as u64,
            unique_phones: result.unique_phones().len() as u64,
        }
    }

    /// Total extracted records (documents, articles and tables)
    pub fn records_found(&self) -> u64 {
        self.documents_found + self.articles_found + self.tables_found
    }
}

/// Writes the summary to the log, one line per figure
pub fn log_summary(summary: &RunSummary) {
    tracing::info!("=== Scraping Summary ===");
    tracing::info!("Sources: {}", summary.sources_total);
    if summary.sources_blocked > 0 {
        tracing::info!("Sources blocked by robots.txt: {}", summary.sources_blocked);
    }
    if summary.sources_failed > 0 {
        tracing::warn!("Sources failed: {}", summary.sources_failed);
    }
    tracing::info!("Pages scraped: {}", summary.pages_scraped);
    tracing::info!("Total URLs visited: {}", summary.total_urls_visited);
    tracing::info!("Total requests made: {}", summary.total_requests);
    tracing::info!("Documents found: {}", summary.documents_found);
    tracing::info!("Articles found: {}", summary.articles_found);
    tracing::info!("Tables found: {}", summary.tables_found);
    tracing::info!("Unique emails: {}", summary.unique_emails);
    tracing::info!("Unique phones: {}", summary.unique_phones);
}
