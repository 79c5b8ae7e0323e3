//! Polite-Scraper main entry point
//!
//! This is the command-line interface for the Polite-Scraper fetch and extraction pipeline.

use anyhow::{bail, Context};
use clap::Parser;
use polite_scraper::config::{load_config_with_hash, validate, Config};
use polite_scraper::output::{print_statistics, OutputFormat, OutputWriter, RecordSink, ScrapeStatistics};
use polite_scraper::{Scraper, SelectorExtractor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Polite-Scraper: a polite web scraper
///
/// Polite-Scraper fetches pages while respecting robots.txt, crawl delays and
/// per-site concurrency limits, extracts records with CSS selectors, and
/// writes them as CSV or JSON Lines.
#[derive(Parser, Debug)]
#[command(name = "polite-scraper")]
#[command(version)]
#[command(about = "A polite web scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// URL to scrape (repeatable)
    #[arg(short, long = "url", value_name = "URL")]
    urls: Vec<String>,

    /// Maximum number of URLs to process
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Output file path
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Output format: csv or jsonl
    #[arg(short, long, value_name = "FORMAT")]
    format: Option<OutputFormat>,

    /// Minimum delay between requests to one site (milliseconds)
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// User-Agent header to send
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Honor robots.txt rules and crawl delays
    #[arg(long, overrides_with = "no_respect_robots")]
    respect_robots: bool,

    /// Ignore robots.txt
    #[arg(long, overrides_with = "respect_robots")]
    no_respect_robots: bool,

    /// Validate config and show what would be scraped without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line values on top of the file configuration
    fn apply_overrides(&self, config: &mut Config) {
        if !self.urls.is_empty() {
            config.scrape.urls = self.urls.clone();
        }
        if let Some(max_pages) = self.max_pages {
            config.scrape.max_pages = Some(max_pages);
        }
        if let Some(delay_ms) = self.delay_ms {
            config.scrape.min_delay_ms = delay_ms;
        }
        if let Some(user_agent) = &self.user_agent {
            config.fetch.user_agent = user_agent.clone();
        }
        if self.respect_robots {
            config.scrape.respect_robots = true;
        }
        if self.no_respect_robots {
            config.scrape.respect_robots = false;
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(output) = &self.output {
            config.output.path = output.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    cli.apply_overrides(&mut config);
    validate(&config).context("Invalid configuration")?;

    if config.scrape.urls.is_empty() {
        bail!("No URLs to scrape; pass --url or set [scrape] urls in the config file");
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_scrape(config, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("polite_scraper=info,warn"),
            1 => EnvFilter::new("polite_scraper=debug,info"),
            2 => EnvFilter::new("polite_scraper=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Polite-Scraper Dry Run ===\n");

    println!("Fetch Configuration:");
    println!("  User agent: {}", config.fetch.user_agent);
    println!("  Requests per domain: {}", config.fetch.domain_concurrency);
    println!("  Max retries: {}", config.fetch.max_retries);
    println!("  Base backoff: {}ms", config.fetch.base_backoff_ms);
    println!(
        "  Timeouts: connect {}ms, request {}ms, robots.txt {}ms",
        config.fetch.connect_timeout_ms, config.fetch.request_timeout_ms, config.fetch.robots_timeout_ms
    );

    println!("\nPoliteness:");
    println!("  Respect robots.txt: {}", config.scrape.respect_robots);
    println!("  Minimum delay: {}ms", config.scrape.min_delay_ms);
    println!("  Concurrent URLs: {}", config.scrape.max_concurrent_urls);

    println!("\nOutput:");
    println!("  Path: {}", config.output.path);
    println!("  Format: {}", config.output.format);
    println!("  Rotate after: {} bytes", config.output.max_file_size);

    let limit = config.scrape.max_pages.unwrap_or(usize::MAX);
    println!("\nURLs ({}):", config.scrape.urls.len());
    for (i, url) in config.scrape.urls.iter().enumerate() {
        let note = if i >= limit { " (over max-pages, skipped)" } else { "" };
        println!("  - {}{}", url, note);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main scrape operation
async fn handle_scrape(config: Config, quiet: bool) -> anyhow::Result<()> {
    let Config {
        fetch,
        scrape,
        output,
        selectors,
    } = config;

    let mut writer = OutputWriter::create(Path::new(&output.path), output.format, output.max_file_size)
        .with_context(|| format!("Failed to open output file {}", output.path))?;

    let extractor = Arc::new(SelectorExtractor::new(selectors));
    let scraper = Scraper::new(scrape, fetch, extractor).context("Failed to initialize scraper")?;

    let reports = scraper.run().await;

    for report in &reports {
        writer
            .write(&report.records)
            .with_context(|| format!("Failed to write records for {}", report.url))?;
    }
    let files_written = writer.files_written();
    writer.close().context("Failed to close output")?;

    let stats = ScrapeStatistics::from_reports(&reports);
    tracing::info!(
        "Wrote {} records to {} ({} file(s))",
        stats.total_records,
        output.path,
        files_written
    );

    if !quiet {
        println!();
        print_statistics(&stats);
    }

    Ok(())
}
