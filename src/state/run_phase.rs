//! Run phase definitions for the crawl driver
//!
//! A run moves `Idle → ScrapingSource ⇄ ScrapingPage → … → Done`.

use std::fmt;

/// Represents where the crawl driver is within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// Created, nothing fetched yet
    Idle,

    /// Working through one source (robots gate, seed resolution)
    ScrapingSource,

    /// Fetching and extracting a single page
    ScrapingPage,

    /// All sources and extra passes processed; the result is final
    Done,
}

impl RunPhase {
    /// Returns true if moving from `self` to `next` is a legal step
    pub fn can_transition_to(&self, next: RunPhase) -> bool {
        use RunPhase::*;
        matches!(
            (self, next),
            (Idle, ScrapingSource)
                | (Idle, Done)
                | (ScrapingSource, ScrapingSource)
                | (ScrapingSource, ScrapingPage)
                | (ScrapingSource, Done)
                | (ScrapingPage, ScrapingSource)
        )
    }

    /// Returns true once the run can no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ScrapingSource => "scraping-source",
            Self::ScrapingPage => "scraping-page",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
