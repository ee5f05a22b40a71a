//! Robots.txt handling module
//!
//! Retrieval and evaluation of a site's robots.txt. Retrieval never fails:
//! every outcome carries the verdict to fall back on, so the gate in
//! [`crate::crawler::FetchPolicy::may_fetch`] stays a plain boolean.

mod parser;

pub use parser::{ParsedRobots, WILDCARD_AGENT};

use reqwest::{Client, StatusCode};
use url::Url;

/// Result of retrieving a site's robots.txt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobotsOutcome {
    /// robots.txt was retrieved (or answered with a status that decides the verdict)
    Fetched(ParsedRobots),

    /// robots.txt could not be retrieved; falls back to allowing the fetch
    Unavailable { reason: String },
}

impl RobotsOutcome {
    /// Whether the wildcard agent may fetch `url` under this outcome
    pub fn allows(&self, url: &Url) -> bool {
        match self {
            Self::Fetched(robots) => robots.allows(url.as_str()),
            Self::Unavailable { .. } => true,
        }
    }
}

/// Returns the robots.txt location for a site
///
/// robots.txt always lives at the host root, whatever path the base URL has.
pub fn robots_url(base_url: &Url) -> Result<Url, url::ParseError> {
    base_url.join("/robots.txt")
}

/// Fetches and parses robots.txt for a site
///
/// | Response | Outcome |
/// |----------|---------|
/// | 200 | `Fetched(from_content(body))` |
/// | 401, 403 | `Fetched(DisallowAll)` |
/// | other 4xx | `Fetched(AllowAll)` |
/// | 5xx, network error, unreadable body | `Unavailable` |
pub async fn fetch_robots(client: &Client, base_url: &Url) -> RobotsOutcome {
    let url = match robots_url(base_url) {
        Ok(url) => url,
        Err(e) => {
            return RobotsOutcome::Unavailable {
                reason: format!("cannot build robots.txt URL: {}", e),
            }
        }
    };

    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            return RobotsOutcome::Unavailable {
                reason: e.to_string(),
            }
        }
    };

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return RobotsOutcome::Fetched(ParsedRobots::DisallowAll);
    }
    if status.is_client_error() {
        return RobotsOutcome::Fetched(ParsedRobots::AllowAll);
    }
    if !status.is_success() {
        return RobotsOutcome::Unavailable {
            reason: format!("{} answered {}", url, status.as_u16()),
        };
    }

    match response.text().await {
        Ok(body) => RobotsOutcome::Fetched(ParsedRobots::from_content(&body)),
        Err(e) => RobotsOutcome::Unavailable {
            reason: e.to_string(),
        },
    }
}
