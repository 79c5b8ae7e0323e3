use crate::extract::SelectorConfig;
use crate::output::OutputFormat;
use serde::Deserialize;
use std::time::Duration;

/// Default User-Agent sent with every request
pub const DEFAULT_USER_AGENT: &str =
    "PoliteScraper/1.0 (+https://github.com/polite-scraper/polite-scraper)";

/// Main configuration structure for Polite-Scraper
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub scrape: ScrapeSettings,
    pub output: OutputConfig,
    pub selectors: SelectorConfig,
}

/// Transport, pacing and retry configuration consumed by the fetch core
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetchConfig {
    /// User-Agent header value; its product token is matched against robots.txt
    pub user_agent: String,

    /// Connect timeout for each attempt (milliseconds)
    pub connect_timeout_ms: u64,

    /// Total timeout for each attempt (milliseconds)
    pub request_timeout_ms: u64,

    /// Timeout for robots.txt fetches (milliseconds)
    pub robots_timeout_ms: u64,

    /// Maximum simultaneous in-flight requests per domain
    pub domain_concurrency: usize,

    /// Retries after the initial attempt
    pub max_retries: u32,

    /// Backoff before the first retry; doubles for each following retry (milliseconds)
    pub base_backoff_ms: u64,

    /// Crawl delay used when robots.txt does not specify one (milliseconds)
    pub default_crawl_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            robots_timeout_ms: 10_000,
            domain_concurrency: 2,
            max_retries: 3,
            base_backoff_ms: 1_000,
            default_crawl_delay_ms: 1_000,
        }
    }
}

impl FetchConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn robots_timeout(&self) -> Duration {
        Duration::from_millis(self.robots_timeout_ms)
    }

    pub fn base_backoff(&self) -> Duration {
        Duration::from_millis(self.base_backoff_ms)
    }
}

/// What to scrape and how politely
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScrapeSettings {
    /// Seed URLs to fetch
    pub urls: Vec<String>,

    /// Maximum number of URLs processed in one run
    pub max_pages: Option<usize>,

    /// Minimum time between requests to one domain (milliseconds)
    ///
    /// Used as-is when robots handling is off, and as a floor under the
    /// robots.txt crawl delay when it is on.
    pub min_delay_ms: u64,

    /// Whether robots.txt rules and crawl delays are honored
    pub respect_robots: bool,

    /// Size of the worker pool used to fan out over URLs
    pub max_concurrent_urls: usize,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            max_pages: None,
            min_delay_ms: 1_000,
            respect_robots: true,
            max_concurrent_urls: 8,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path of the first output file; rotated files are numbered after it
    pub path: String,

    /// Output encoding
    pub format: OutputFormat,

    /// Size in bytes after which a new numbered file is started
    pub max_file_size: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "output.csv".to_string(),
            format: OutputFormat::Csv,
            max_file_size: 10 * 1024 * 1024,
        }
    }
}
