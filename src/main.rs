//! Oda crawler main entry point
//!
//! This is the command-line interface for the product crawler.

use anyhow::Context;
use clap::Parser;
use oda_crawler::config::{config_from_env, load_config_with_hash, validate, Config};
use oda_crawler::crawler::run_crawl;
use oda_crawler::output::print_statistics;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Oda crawler: fetches a site, extracts products and records broken links
///
/// The origin defaults to https://oda.com and can be changed with the
/// BASE_URL environment variable, a config file, or --base-url.
#[derive(Parser, Debug)]
#[command(name = "oda-crawler")]
#[command(version)]
#[command(about = "A bounded-concurrency product crawler", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Origin every relative path resolves against
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Path the crawl starts from
    #[arg(long, value_name = "PATH")]
    start_path: Option<String>,

    /// Deepest level that is still fetched
    #[arg(long)]
    max_depth: Option<u32>,

    /// Maximum number of fetches in flight
    #[arg(long)]
    concurrency: Option<u32>,

    /// Where to write the product map
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Where to write the broken link list
    #[arg(long, value_name = "FILE")]
    broken_links_output: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    let report = run_crawl(config).await.context("Crawl failed")?;

    if !cli.quiet {
        print_statistics(&report.statistics);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` wins over the flags when it is set.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("error")
        } else {
            match verbose {
                0 => EnvFilter::new("oda_crawler=info,warn"),
                1 => EnvFilter::new("oda_crawler=debug,info"),
                2 => EnvFilter::new("oda_crawler=trace,debug"),
                _ => EnvFilter::new("trace"),
            }
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Layers the config file (or defaults), the environment and the CLI flags
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => config_from_env(),
    };

    if let Some(base_url) = &cli.base_url {
        config.crawler.base_url = base_url.clone();
    }
    if let Some(start_path) = &cli.start_path {
        config.crawler.start_path = start_path.clone();
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.max_concurrent_fetches = concurrency;
    }
    if let Some(output) = &cli.output {
        config.output.products_path = output.clone();
    }
    if let Some(path) = &cli.broken_links_output {
        config.output.broken_links_path = path.clone();
    }
    if cli.pretty {
        config.output.pretty = true;
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}
