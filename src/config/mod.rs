//! Configuration module for Health-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and provides the built-in source list used when no file is given.
//!
//! # Example
//!
//! ```no_run
//! use health_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Request delay: {}ms", config.fetch.request_delay_ms);
//! ```

mod parser;
mod sources;
mod types;
mod validation;

pub use types::{
    Config, ExtractionConfig, FetchConfig, OutputConfig, SitrepConfig, Source, SourceCategory,
    UserAgentConfig,
};

pub use parser::{
    builtin_config, compute_config_hash, load_config, load_config_with_hash, parse_config,
};
pub use sources::default_sources;
pub use validation::validate;
