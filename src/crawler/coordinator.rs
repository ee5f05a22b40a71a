//! Crawler coordinator - main harvest orchestration logic
//!
//! This module contains the crawl driver that coordinates a run:
//! - Walking configured sources in order, gated by robots.txt
//! - Fetching each seed page once per run
//! - Feeding fetched pages to the extractors and aggregating the records
//! - Running the situation-report pass
//! - Handing the result set and summary to the output handler
//!
//! Work is strictly sequential: every fetch is awaited before the next one
//! starts, so pacing holds across all sites.

use crate::config::{Config, Source};
use crate::crawler::fetcher::{FetchOutcome, FetchPolicy};
use crate::crawler::parser::parse_html;
use crate::crawler::sitreps::scrape_sitreps;
use crate::extract::extract_page;
use crate::output::{
    log_summary, FileOutput, OutputHandler, PageResult, RunResult, RunSummary, RunTally,
};
use crate::state::{RunContext, RunPhase};
use crate::url::{parse_base_url, resolve_seed, snapshot_stem, visit_key};
use crate::HarvestError;
use chrono::Utc;
use std::sync::Arc;
use url::Url;

/// Seed URLs a source would be fetched with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePlan {
    pub key: String,
    pub name: String,
    pub base_url: Url,
    pub seeds: Vec<Url>,
}

impl SourcePlan {
    /// Resolves a source's base URL and seed paths without touching the network
    pub fn for_source(source: &Source) -> Result<Self, HarvestError> {
        let base_url = parse_base_url(&source.base_url)?;
        let seeds = source
            .pages
            .iter()
            .map(|path| resolve_seed(&base_url, path))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            key: source.key.clone(),
            name: source.name.clone(),
            base_url,
            seeds,
        })
    }
}

/// Main crawl driver
///
/// Owns the run-wide result set and visited set for the lifetime of a run.
pub struct Coordinator {
    config: Arc<Config>,
    context: Arc<RunContext>,
    policy: FetchPolicy,
    output: Option<Box<dyn OutputHandler>>,
    phase: RunPhase,
    result: RunResult,
    tally: RunTally,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The harvest configuration
    /// * `context` - Run-scoped context shared with the fetch policy
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn new(config: Config, context: Arc<RunContext>) -> Result<Self, HarvestError> {
        let policy = FetchPolicy::from_config(&config, Arc::clone(&context))?;
        let tally = RunTally {
            sources_total: config.sources.len() as u64,
            ..RunTally::default()
        };

        Ok(Self {
            config: Arc::new(config),
            context,
            policy,
            output: None,
            phase: RunPhase::Idle,
            result: RunResult::new(),
            tally,
        })
    }

    /// Attaches the handler that receives HTML snapshots
    pub fn with_output(mut self, output: Box<dyn OutputHandler>) -> Self {
        self.output = Some(output);
        self
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn result(&self) -> &RunResult {
        &self.result
    }

    pub fn tally(&self) -> RunTally {
        self.tally
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    fn transition(&mut self, next: RunPhase) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::trace!("Run phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Runs the whole pipeline once
    ///
    /// An error while scraping one source, or in the situation-report pass,
    /// is logged and the run moves on. Only calling `run` on a finished
    /// coordinator fails.
    pub async fn run(&mut self) -> Result<(), HarvestError> {
        if self.phase.is_terminal() {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: RunPhase::ScrapingSource,
            });
        }

        tracing::info!(
            "Starting harvest of {} sources (config {})",
            self.config.sources.len(),
            self.context.config_hash()
        );

        let config = Arc::clone(&self.config);
        for source in &config.sources {
            if let Err(e) = self.scrape_source(source).await {
                tracing::error!("Error scraping {}: {}", source.name, e);
                self.tally.sources_failed += 1;
            }
        }

        if config.sitreps.enabled {
            self.transition(RunPhase::ScrapingSource)?;
            match scrape_sitreps(&self.policy, &config.sitreps).await {
                Ok(reports) => self.result.documents.extend(reports),
                Err(e) => tracing::error!("Error in situation report pass: {}", e),
            }
        }

        self.transition(RunPhase::Done)?;
        tracing::info!("Harvest complete");
        Ok(())
    }

    /// Scrapes every seed page of one source
    ///
    /// If robots.txt disallows the base URL no page of the source is
    /// requested at all.
    pub async fn scrape_source(&mut self, source: &Source) -> Result<(), HarvestError> {
        self.transition(RunPhase::ScrapingSource)?;
        tracing::info!("Scraping: {}", source.name);

        let plan = SourcePlan::for_source(source)?;

        if !self.policy.may_fetch(&plan.base_url).await {
            tracing::warn!("Skipping {} - blocked by robots.txt", source.name);
            self.tally.sources_blocked += 1;
            return Ok(());
        }

        for url in &plan.seeds {
            self.scrape_page(url, &source.name).await?;
        }

        Ok(())
    }

    /// Fetches and extracts one page, at most once per run
    ///
    /// The URL is marked visited before the fetch, so a failed page is not
    /// retried later in the run either. Returns `None` for visited URLs and
    /// failed fetches.
    pub async fn scrape_page(
        &mut self,
        url: &Url,
        source_name: &str,
    ) -> Result<Option<PageResult>, HarvestError> {
        let key = visit_key(url);
        if self.result.is_visited(&key) {
            tracing::info!("Skipping already visited: {}", url);
            return Ok(None);
        }

        self.transition(RunPhase::ScrapingPage)?;
        self.result.mark_visited(key);

        let page = self.fetch_and_extract(url, source_name).await;

        self.transition(RunPhase::ScrapingSource)?;

        if let Some(page) = &page {
            self.tally.pages_scraped += 1;
            self.result.absorb(page.clone());
        }
        Ok(page)
    }

    async fn fetch_and_extract(&self, url: &Url, source_name: &str) -> Option<PageResult> {
        let fetched = self.policy.fetch(url).await;
        let page = match fetched.outcome {
            FetchOutcome::Success(page) => page,
            FetchOutcome::Failure(reason) => {
                tracing::warn!(
                    "Failed to fetch {} after {} attempts: {}",
                    url,
                    fetched.attempts,
                    reason
                );
                return None;
            }
        };

        let parsed = parse_html(&page.text());

        if self.config.output.save_html {
            if let Some(output) = &self.output {
                let stem = snapshot_stem(url, source_name);
                if let Err(e) = output.save_snapshot(&stem, &page.body) {
                    tracing::warn!("Could not save HTML snapshot for {}: {}", url, e);
                }
            }
        }

        let found = extract_page(&parsed.document, url, &self.config.extraction);
        tracing::info!(
            "Extracted: {} docs, {} articles, {} tables",
            found.documents.len(),
            found.articles.len(),
            found.tables.len()
        );

        Some(PageResult {
            url: url.to_string(),
            source_name: source_name.to_string(),
            scraped_at: Utc::now(),
            title: parsed.title,
            documents: found.documents,
            articles: found.articles,
            tables: found.tables,
            contacts: found.contacts,
        })
    }

    /// Computes the summary of the run so far
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_run(&self.result, &self.context, &self.tally)
    }

    /// Consumes the coordinator, returning the result set and its summary
    pub fn finish(self) -> (RunResult, RunSummary) {
        let summary = self.summary();
        (self.result, summary)
    }
}

/// Resolves every configured source without fetching anything
pub fn plan_sources(config: &Config) -> Result<Vec<SourcePlan>, HarvestError> {
    config.sources.iter().map(SourcePlan::for_source).collect()
}

/// Runs the main harvest operation
///
/// This function orchestrates the entire run:
///
/// 1. Create the output directory layout (the only fatal setup step)
/// 2. Build the HTTP client and fetch policy
/// 3. Scrape every source, then the situation-report pass
/// 4. Compute and log the summary
/// 5. Persist the result set, exports and summary
///
/// # Example
///
/// ```no_run
/// use health_harvest::config::load_config_with_hash;
/// use health_harvest::crawler::run_harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("harvest.toml"))?;
/// let summary = run_harvest(config, hash).await?;
/// println!("{} documents", summary.documents_found);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(
    config: Config,
    config_hash: impl Into<String>,
) -> Result<RunSummary, HarvestError> {
    let output = FileOutput::prepare(&config.output.directory)?;
    let context = Arc::new(RunContext::new(config_hash));

    let mut coordinator =
        Coordinator::new(config, Arc::clone(&context))?.with_output(Box::new(output.clone()));
    coordinator.run().await?;

    let (result, summary) = coordinator.finish();
    log_summary(&summary);
    output.persist(&result, &summary)?;

    tracing::info!("Results saved in: {}/", output.root().display());
    Ok(summary)
}
