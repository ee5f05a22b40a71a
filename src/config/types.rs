use serde::Deserialize;

use crate::config::sources::default_sources;

/// Main configuration structure for Health-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub sitreps: SitrepConfig,
    /// Target sites, visited in file order
    #[serde(rename = "source", default)]
    pub sources: Vec<Source>,
}

impl Default for Config {
    /// The built-in configuration: default settings plus the five public
    /// health sources.
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            user_agent: UserAgentConfig::default(),
            output: OutputConfig::default(),
            extraction: ExtractionConfig::default(),
            sitreps: SitrepConfig::default(),
            sources: default_sources(),
        }
    }
}

/// Request pacing and retry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Fixed delay before every request attempt (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Maximum number of attempts per URL
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Backoff unit applied after an HTTP 429 (milliseconds)
    #[serde(rename = "rate-limit-backoff-ms")]
    pub rate_limit_backoff_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 2_000,
            max_attempts: 3,
            timeout_secs: 30,
            rate_limit_backoff_ms: 10_000,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// Why the pages are being collected
    pub purpose: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the header value, e.g. `ResearchBot/1.0 (Health Data Analysis; contact@example.com)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} ({}; {})",
            self.crawler_name, self.crawler_version, self.purpose, self.contact_email
        )
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "ResearchBot".to_string(),
            crawler_version: "1.0".to_string(),
            purpose: "Health Data Analysis".to_string(),
            contact_email: "contact@example.com".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory for snapshots, exports, summary and log
    pub directory: String,

    /// Whether raw HTML snapshots are written for every fetched page
    #[serde(rename = "save-html")]
    pub save_html: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "scraped_data".to_string(),
            save_html: true,
        }
    }
}

/// Tuning for the extraction heuristics
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Article titles must be strictly longer than this many characters
    #[serde(rename = "min-article-title-len")]
    pub min_article_title_len: usize,

    /// Bound on document context text (characters)
    #[serde(rename = "context-chars")]
    pub context_chars: usize,

    /// Bound on article summary text (characters)
    #[serde(rename = "summary-chars")]
    pub summary_chars: usize,

    /// Link suffixes treated as downloadable documents (case-insensitive)
    #[serde(rename = "document-suffixes")]
    pub document_suffixes: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_article_title_len: 10,
            context_chars: 500,
            summary_chars: 1_000,
            document_suffixes: vec![".pdf".to_string()],
        }
    }
}

/// Situation-report pass configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SitrepConfig {
    pub enabled: bool,

    /// Listing page to scan for report links
    pub url: String,

    /// Lower-case href fragments that mark a report link
    pub keywords: Vec<String>,
}

impl Default for SitrepConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "https://ncdc.gov.ng/diseases/sitreps".to_string(),
            keywords: vec!["sitrep".to_string()],
        }
    }
}

/// A named target site
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Source {
    /// Identity of the source
    pub key: String,

    /// Human-readable name, recorded on every page result
    pub name: String,

    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Seed paths, resolved against `base_url`
    pub pages: Vec<String>,

    #[serde(default)]
    pub category: SourceCategory,
}

/// What kind of material a source mostly publishes
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategory {
    Guidelines,
    DiseaseData,
    Reports,
    #[default]
    #[serde(other)]
    Other,
}

impl SourceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guidelines => "guidelines",
            Self::DiseaseData => "disease_data",
            Self::Reports => "reports",
            Self::Other => "other",
        }
    }
}
