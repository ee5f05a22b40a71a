use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// What kind of downloadable document a link points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Found by the document extractor on a regular page
    Pdf,
    /// Found by the situation-report pass
    DiseaseReport,
}

/// A downloadable-document link found on a page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedDocument {
    pub title: String,

    /// Absolute document URL
    pub url: String,

    /// Text of the nearest enclosing block, bounded
    pub context: String,

    #[serde(rename = "type")]
    pub kind: DocumentKind,

    pub extracted_at: DateTime<Utc>,
}

/// An article-like content block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedArticle {
    pub title: String,
    pub url: Option<String>,
    pub date: Option<String>,

    /// Block text, bounded
    pub summary: String,

    pub extracted_at: DateTime<Utc>,
}

/// One row of a parsed table: column name to cell value, in column order
pub type TableRow = Map<String, Value>;

/// Marker serialized as the `type` of every table record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Table,
}

/// A successfully parsed HTML table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedTable {
    /// Caption text, or `Table N` by position on the page
    pub title: String,

    #[serde(rename = "type")]
    pub kind: TableKind,

    #[serde(rename = "data")]
    pub rows: Vec<TableRow>,

    pub extracted_at: DateTime<Utc>,
}

/// Contact details found on one page, deduplicated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactInfo {
    pub emails: BTreeSet<String>,
    pub phones: BTreeSet<String>,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.phones.is_empty()
    }
}
