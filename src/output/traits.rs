//! Output handler traits and record types
//!
//! This module defines the per-page and run-wide result structures owned by
//! the crawl driver, and the trait interface of the persistence collaborator
//! that receives them.

use crate::extract::{ContactInfo, ExtractedArticle, ExtractedDocument, ExtractedTable};
use crate::output::stats::RunSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Everything extracted from one successfully fetched page
///
/// Built once per page and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct PageResult {
    pub url: String,
    pub source_name: String,
    pub scraped_at: DateTime<Utc>,
    pub title: String,
    pub documents: Vec<ExtractedDocument>,
    pub articles: Vec<ExtractedArticle>,
    pub tables: Vec<ExtractedTable>,
    pub contacts: ContactInfo,
}

/// Run-wide aggregate of all page results
///
/// Documents, articles and tables are concatenated across pages in the
/// order pages were scraped. Contacts stay keyed by the page they came from.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunResult {
    pub documents: Vec<ExtractedDocument>,
    pub articles: Vec<ExtractedArticle>,
    pub tables: Vec<ExtractedTable>,
    pub contacts: BTreeMap<String, ContactInfo>,
    pub visited: BTreeSet<String>,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key` as visited; returns false if it already was
    pub fn mark_visited(&mut self, key: impl Into<String>) -> bool {
        self.visited.insert(key.into())
    }

    pub fn is_visited(&self, key: &str) -> bool {
        self.visited.contains(key)
    }

    /// Appends a page's records to the aggregate
    pub fn absorb(&mut self, page: PageResult) {
        self.documents.extend(page.documents);
        self.articles.extend(page.articles);
        self.tables.extend(page.tables);
        if !page.contacts.is_empty() {
            self.contacts.insert(page.url, page.contacts);
        }
    }

    /// Distinct email addresses across all pages
    pub fn unique_emails(&self) -> BTreeSet<&str> {
        self.contacts
            .values()
            .flat_map(|c| c.emails.iter().map(String::as_str))
            .collect()
    }

    /// Distinct phone numbers across all pages
    pub fn unique_phones(&self) -> BTreeSet<&str> {
        self.contacts
            .values()
            .flat_map(|c| c.phones.iter().map(String::as_str))
            .collect()
    }
}

/// Trait for output handlers
///
/// An output handler is the persistence collaborator of a run: it receives
/// raw HTML snapshots while the run progresses and the final result set and
/// summary when it ends.
pub trait OutputHandler {
    /// Writes the raw markup of a fetched page
    ///
    /// # Arguments
    ///
    /// * `stem` - Sanitized file stem derived from the page URL
    /// * `body` - The raw response body
    ///
    /// # Returns
    ///
    /// The path the snapshot was written to
    fn save_snapshot(&self, stem: &str, body: &[u8]) -> OutputResult<PathBuf>;

    /// Writes the final result set and summary
    fn persist(&self, result: &RunResult, summary: &RunSummary) -> OutputResult<()>;
}
