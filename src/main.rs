//! Support-Harvest main entry point
//!
//! This is the command-line interface for the Support-Harvest help-site
//! harvester.

use anyhow::Context;
use chrono::Duration;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use support_harvest::config::{
    load_config_with_hash, Config, MAX_BATCH_SIZE, MAX_LEASE_SECS,
};
use support_harvest::crawler::Coordinator;
use support_harvest::output::{export_feed, load_statistics, print_statistics, FeedChannel};
use support_harvest::storage::SqliteStorage;
use tracing_subscriber::EnvFilter;

/// Support-Harvest: an incremental help-site harvester
///
/// Support-Harvest discovers topic and answer pages on a help site, keeps a
/// resumable frontier of them, and harvests answer pages into a content
/// table that can be exported as an RSS feed.
#[derive(Parser, Debug)]
#[command(name = "support-harvest")]
#[command(version = "1.0.0")]
#[command(about = "An incremental help-site harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Seed the frontier from a topic page
    Seed {
        /// Topic page URL (absolute or site-relative)
        url: String,
    },

    /// Run crawl steps against the frontier
    Step {
        /// Items processed per step (1-100, default from config)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=MAX_BATCH_SIZE as i64))]
        batch_size: Option<u32>,

        /// Number of consecutive steps; stops early once nothing is pending
        #[arg(short, long, default_value_t = 1)]
        steps: u32,
    },

    /// Return stale in-progress items to pending
    Requeue {
        /// Reservation age after which an item is stale
        /// (default: lease-timeout-secs from config, else 3600)
        #[arg(long, value_parser = clap::value_parser!(u64).range(0..=MAX_LEASE_SECS))]
        older_than_secs: Option<u64>,
    },

    /// Show statistics from the database and exit
    Stats,

    /// Write all harvested articles to the configured RSS feed
    ExportFeed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    match cli.command {
        Command::Seed { url } => handle_seed(&config, &url).await,
        Command::Step { batch_size, steps } => handle_step(&config, batch_size, steps).await,
        Command::Requeue { older_than_secs } => handle_requeue(&config, older_than_secs),
        Command::Stats => handle_stats(&config),
        Command::ExportFeed => handle_export_feed(&config),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("support_harvest=info,warn"),
            1 => EnvFilter::new("support_harvest=debug,info"),
            2 => EnvFilter::new("support_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles `seed`: fetches a topic page and enqueues its links
async fn handle_seed(config: &Config, url: &str) -> anyhow::Result<()> {
    let mut coordinator =
        Coordinator::open(config).context("Failed to initialize the harvester")?;

    let summary = coordinator
        .seed_from_topic(url, &config.crawler.lang)
        .await
        .with_context(|| format!("Failed to seed from {}", url))?;

    println!("Seeded from {}", summary.seed_url);
    println!("  New topics: {}", summary.topics);
    println!("  New answers: {}", summary.answers);
    println!("Run `step` to start harvesting.");

    Ok(())
}

/// Handles `step`: runs up to `steps` crawl passes
async fn handle_step(config: &Config, batch_size: Option<u32>, steps: u32) -> anyhow::Result<()> {
    let mut coordinator =
        Coordinator::open(config).context("Failed to initialize the harvester")?;
    let batch_size = batch_size.unwrap_or(config.crawler.batch_size) as usize;

    for step in 1..=steps.max(1) {
        let summary = coordinator
            .crawl_step(&config.crawler.lang, batch_size)
            .await
            .context("Crawl step failed")?;

        println!(
            "Step {}: answers {}, topics {}, inserted {}, updated {}, errors {}, pending {}",
            step,
            summary.answers,
            summary.topics,
            summary.inserted,
            summary.updated,
            summary.errors,
            summary.pending
        );

        if summary.pending == 0 {
            tracing::info!("Frontier is empty, harvest complete");
            break;
        }
    }

    Ok(())
}

/// Handles `requeue`: returns stale reservations to pending
fn handle_requeue(config: &Config, older_than_secs: Option<u64>) -> anyhow::Result<()> {
    let secs = older_than_secs
        .or(config.crawler.lease_timeout_secs)
        .unwrap_or(3600);
    let older_than = Duration::try_seconds(i64::try_from(secs)?)
        .with_context(|| format!("Reservation age out of range: {}s", secs))?;

    let mut coordinator =
        Coordinator::open(config).context("Failed to initialize the harvester")?;
    let requeued = coordinator.requeue_stale(older_than)?;

    println!("Returned {} items to pending", requeued);

    Ok(())
}

/// Handles `stats`: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_database(config)?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles `export-feed`: writes the content table as RSS
fn handle_export_feed(config: &Config) -> anyhow::Result<()> {
    println!("=== Exporting Feed ===\n");
    println!("Database: {}", config.output.database_path);
    println!("Output: {}", config.output.feed_path);
    println!();

    let storage = open_database(config)?;
    let channel = FeedChannel::for_site(&config.site.origin);

    tracing::info!("Loading articles from database...");
    let written = export_feed(&storage, &channel, Path::new(&config.output.feed_path))
        .with_context(|| format!("Failed to write feed {}", config.output.feed_path))?;

    println!("✓ {} articles exported to: {}", written, config.output.feed_path);

    Ok(())
}

fn open_database(config: &Config) -> anyhow::Result<SqliteStorage> {
    SqliteStorage::new(Path::new(&config.output.database_path))
        .with_context(|| format!("Failed to open database {}", config.output.database_path))
}
