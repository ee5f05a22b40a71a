//! Health-Harvest main entry point
//!
//! This is the command-line interface for the Health-Harvest collector.

use clap::Parser;
use health_harvest::config::{builtin_config, load_config_with_hash, Config};
use health_harvest::crawler::{plan_sources, run_harvest};
use health_harvest::output::{create_output_dirs, log_path};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Health-Harvest: a polite public-health data collector
///
/// Health-Harvest fetches a fixed set of pages from Nigerian government and
/// health organisation sites, respecting robots.txt and a fixed request pace,
/// and exports the documents, articles, tables and contact details it finds.
#[derive(Parser, Debug)]
#[command(name = "health-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A polite public-health data collector", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in sources when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the output directory from the configuration
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Validate config and show what would be fetched without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (mut config, config_hash) = match &cli.config {
        Some(path) => load_config_with_hash(path)?,
        None => builtin_config(),
    };

    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.display().to_string();
    }

    if cli.dry_run {
        setup_logging(cli.verbose, cli.quiet, None);
        return handle_dry_run(&config, &config_hash);
    }

    // Output locations must exist before the log file can be opened
    let root = Path::new(&config.output.directory);
    create_output_dirs(root)?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path(root))?;
    setup_logging(cli.verbose, cli.quiet, Some(log_file));

    match &cli.config {
        Some(path) => tracing::info!(
            "Configuration loaded from {} (hash: {})",
            path.display(),
            config_hash
        ),
        None => tracing::info!("Using built-in configuration"),
    }

    handle_harvest(config, config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Log lines go to stdout and, when a file is given, are appended to it
/// without ANSI colouring.
fn setup_logging(verbose: u8, quiet: bool, log_file: Option<File>) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("health_harvest=info,warn"),
            1 => EnvFilter::new("health_harvest=debug,info"),
            2 => EnvFilter::new("health_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    let file_layer = log_file.map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be fetched
fn handle_dry_run(config: &Config, config_hash: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Health-Harvest Dry Run ===\n");

    println!("Fetch Configuration:");
    println!("  Request delay: {}ms", config.fetch.request_delay_ms);
    println!("  Max attempts: {}", config.fetch.max_attempts);
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!(
        "  Rate limit backoff unit: {}ms",
        config.fetch.rate_limit_backoff_ms
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  Save HTML: {}", config.output.save_html);
    println!("  Config hash: {}", config_hash);

    let plans = plan_sources(config)?;
    println!("\nSources ({}):", plans.len());
    for (plan, source) in plans.iter().zip(&config.sources) {
        println!(
            "  - {} [{}] {} ({} pages)",
            plan.name,
            source.category.as_str(),
            plan.base_url,
            plan.seeds.len()
        );
        for seed in &plan.seeds {
            println!("    * {}", seed);
        }
    }

    if config.sitreps.enabled {
        println!("\nSituation reports: {}", config.sitreps.url);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would fetch {} seed URLs",
        plans.iter().map(|p| p.seeds.len()).sum::<usize>()
    );

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: Config,
    config_hash: String,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("{}", "=".repeat(60));
    tracing::info!("Nigerian Health Data Harvest");
    tracing::info!("Purpose: {}", config.user_agent.purpose);
    tracing::info!("{}", "=".repeat(60));

    let seed_count: usize = config.sources.iter().map(|s| s.pages.len()).sum();
    tracing::info!(
        "Sources: {}, total seed URLs: {}",
        config.sources.len(),
        seed_count
    );

    match run_harvest(config, config_hash).await {
        Ok(summary) => {
            tracing::info!(
                "Harvest completed successfully: {} records from {} pages",
                summary.records_found(),
                summary.pages_scraped
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
