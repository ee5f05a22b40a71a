//! Output module for run results and their persistence
//!
//! This module handles:
//! - The per-page and run-wide result types
//! - Computing and logging the run summary
//! - Writing snapshots, JSON and CSV exports, and the markdown summary

pub mod csv;
mod files;
mod markdown;
pub mod stats;
mod traits;

pub use files::{create_output_dirs, log_path, FileOutput, LOG_FILE_NAME, OUTPUT_SUBDIRS};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{log_summary, RunSummary, RunTally};
pub use traits::{OutputError, OutputHandler, OutputResult, PageResult, RunResult};
