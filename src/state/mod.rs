//! State module for tracking run progress
//!
//! # Components
//!
//! - `RunPhase`: where the crawl driver is within a run (idle, scraping a
//!   source, scraping a page, done)
//! - `RunContext`: run-scoped bookkeeping such as the request counter

mod run_context;
mod run_phase;

pub use run_context::RunContext;
pub use run_phase::RunPhase;
