//! HTTP fetcher implementation
//!
//! This module owns every network call made for page content:
//! - Building the HTTP client with the identifying user agent
//! - The robots.txt gate for a source's base URL
//! - Paced GET requests with a bounded retry loop
//! - Error classification into a [`FetchFailure`]
//!
//! Nothing here returns an error to the caller: every fetch ends in a
//! [`FetchResult`], successful or not.

use crate::config::{Config, FetchConfig};
use crate::robots::{fetch_robots, RobotsOutcome};
use crate::state::RunContext;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum redirect hops followed for a single request
pub const MAX_REDIRECTS: usize = 10;

const ACCEPT_VALUE: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.5";

/// Result of fetching one URL, after all attempts
#[derive(Debug)]
pub struct FetchResult {
    /// The URL that was requested
    pub url: Url,

    /// Number of requests issued for this URL
    pub attempts: u32,

    pub outcome: FetchOutcome,
}

#[derive(Debug)]
pub enum FetchOutcome {
    /// A 200 response
    Success(FetchedPage),

    /// No attempt succeeded
    Failure(FetchFailure),
}

/// Body and metadata of a successful response
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code (always 200)
    pub status_code: u16,

    /// Final URL after redirects
    pub final_url: Url,

    /// Content-Type header value, if present
    pub content_type: Option<String>,

    /// Raw response body, after transfer decompression
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// Decodes the body as UTF-8, replacing invalid sequences
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Why a fetch produced no page
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("rate limited (HTTP 429)")]
    RateLimited,

    #[error("HTTP {0}")]
    Status(u16),
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, FetchOutcome::Success(_))
    }

    /// Returns the fetched page, if any
    pub fn page(&self) -> Option<&FetchedPage> {
        match &self.outcome {
            FetchOutcome::Success(page) => Some(page),
            FetchOutcome::Failure(_) => None,
        }
    }

    /// Returns the failure reason, if any
    pub fn failure(&self) -> Option<&FetchFailure> {
        match &self.outcome {
            FetchOutcome::Success(_) => None,
            FetchOutcome::Failure(reason) => Some(reason),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// The user agent has the form `Name/Version (Purpose; Email)`. Redirects are
/// followed up to [`MAX_REDIRECTS`] hops and compressed bodies are decoded
/// transparently.
///
/// # Example
///
/// ```no_run
/// use health_harvest::config::Config;
/// use health_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));

    let timeout = Duration::from_secs(config.fetch.timeout_secs);

    Client::builder()
        .user_agent(config.user_agent.header_value())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Backoff before `next_attempt` (1-based) following an HTTP 429
///
/// Grows linearly: the wait before the second attempt is twice the unit,
/// before the third three times the unit. Saturates at [`Duration::MAX`].
pub fn rate_limit_backoff(unit: Duration, next_attempt: u32) -> Duration {
    unit.saturating_mul(next_attempt)
}

/// Governs when and how pages are requested
///
/// Holds the shared client, the pacing settings, and the run context whose
/// request counter every issued attempt increments.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    client: Client,
    settings: FetchConfig,
    context: Arc<RunContext>,
}

impl FetchPolicy {
    pub fn new(client: Client, settings: FetchConfig, context: Arc<RunContext>) -> Self {
        Self {
            client,
            settings,
            context,
        }
    }

    /// Builds the client from `config` and wraps it in a policy
    pub fn from_config(config: &Config, context: Arc<RunContext>) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        Ok(Self::new(client, config.fetch.clone(), context))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Whether the wildcard agent may fetch `base_url`
    ///
    /// An unreachable robots.txt allows the fetch and logs a warning.
    pub async fn may_fetch(&self, base_url: &Url) -> bool {
        let outcome = fetch_robots(&self.client, base_url).await;

        if let RobotsOutcome::Unavailable { reason } = &outcome {
            tracing::warn!(
                "Could not check robots.txt for {}: {} (allowing)",
                base_url,
                reason
            );
        }

        let allowed = outcome.allows(base_url);
        if allowed {
            tracing::info!("robots.txt ALLOWED: {}", base_url);
        } else {
            tracing::info!("robots.txt BLOCKED: {}", base_url);
        }
        allowed
    }

    /// Fetches `url` with pacing and retries
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 200 | Return `Success` immediately |
    /// | HTTP 429 | Back off, then retry |
    /// | Timeout | Retry |
    /// | Connection or body error | Retry |
    /// | Any other status | Return `Failure(Status)`, no retry |
    ///
    /// The configured request delay is slept before every attempt, and every
    /// attempt counts against `max-attempts`. When the ceiling is reached the
    /// last failure is returned.
    pub async fn fetch(&self, url: &Url) -> FetchResult {
        let delay = Duration::from_millis(self.settings.request_delay_ms);
        let backoff_unit = Duration::from_millis(self.settings.rate_limit_backoff_ms);
        let max_attempts = self.settings.max_attempts.max(1);

        let mut last_failure = FetchFailure::Timeout;
        let mut attempts = 0;

        for attempt in 1..=max_attempts {
            if attempt > 1 && last_failure == FetchFailure::RateLimited {
                let wait = rate_limit_backoff(backoff_unit, attempt);
                tracing::warn!(
                    "Rate limited on {}, waiting {:?} before attempt {}",
                    url,
                    wait,
                    attempt
                );
                tokio::time::sleep(wait).await;
            }

            tokio::time::sleep(delay).await;
            attempts = attempt;
            let total = self.context.record_request();
            tracing::debug!("GET {} (attempt {}, request #{})", url, attempt, total);

            match self.attempt(url).await {
                Ok(page) => {
                    tracing::info!("Fetched {} ({} bytes)", url, page.body.len());
                    return FetchResult {
                        url: url.clone(),
                        attempts,
                        outcome: FetchOutcome::Success(page),
                    };
                }
                Err(FetchFailure::Status(code)) => {
                    tracing::warn!("HTTP {} for {}", code, url);
                    return FetchResult {
                        url: url.clone(),
                        attempts,
                        outcome: FetchOutcome::Failure(FetchFailure::Status(code)),
                    };
                }
                Err(failure) => {
                    tracing::warn!(
                        "Attempt {}/{} failed for {}: {}",
                        attempt,
                        max_attempts,
                        url,
                        failure
                    );
                    last_failure = failure;
                }
            }
        }

        tracing::error!("Giving up on {} after {} attempts", url, attempts);
        FetchResult {
            url: url.clone(),
            attempts,
            outcome: FetchOutcome::Failure(last_failure),
        }
    }

    /// Issues a single GET and classifies the response
    async fn attempt(&self, url: &Url) -> Result<FetchedPage, FetchFailure> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchFailure::RateLimited);
        }
        if status != StatusCode::OK {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await.map_err(classify_error)?.to_vec();

        Ok(FetchedPage {
            status_code: status.as_u16(),
            final_url,
            content_type,
            body,
        })
    }
}

fn classify_error(error: reqwest::Error) -> FetchFailure {
    if error.is_timeout() {
        FetchFailure::Timeout
    } else {
        FetchFailure::Transport(error.to_string())
    }
}
