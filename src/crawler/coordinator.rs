//! Scrape coordinator - per-URL orchestration and fan-out
//!
//! For every URL the coordinator:
//! 1. Checks robots.txt (when politeness is on) and skips disallowed URLs
//! 2. Determines the crawl delay for the URL's domain
//! 3. Fetches the page through the shared `Fetcher`
//! 4. Hands 2xx bodies to the extractor
//!
//! Failures are isolated per URL: any error becomes an empty result for that
//! URL and never aborts the rest of the batch.

use crate::config::{FetchConfig, ScrapeSettings};
use crate::crawler::fetcher::Fetcher;
use crate::extract::{Extractor, Record};
use crate::robots::RobotsCache;
use crate::url::{domain_key, parse_http_url};
use crate::ScrapeError;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// What happened to one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlOutcome {
    /// Fetched with a 2xx status; carries the number of records extracted
    Extracted(usize),

    /// Skipped because robots.txt disallows it
    Disallowed,

    /// Final response had a non-2xx status
    HttpStatus(u16),

    /// No usable response (invalid URL, transport failure, task failure)
    Failed(String),
}

impl UrlOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Extracted(_))
    }
}

impl fmt::Display for UrlOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extracted(n) => write!(f, "extracted {} records", n),
            Self::Disallowed => f.write_str("disallowed by robots.txt"),
            Self::HttpStatus(status) => write!(f, "HTTP status {}", status),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Result of processing one URL
#[derive(Debug, Clone)]
pub struct UrlReport {
    pub url: String,
    pub outcome: UrlOutcome,
    pub records: Vec<Record>,
}

impl UrlReport {
    fn empty(url: &str, outcome: UrlOutcome) -> Self {
        Self {
            url: url.to_string(),
            outcome,
            records: Vec::new(),
        }
    }
}

/// Main scraper coordinator
///
/// Cloning is cheap; clones share the fetcher, robots cache and worker pool.
#[derive(Clone)]
pub struct Scraper {
    settings: Arc<ScrapeSettings>,
    fetcher: Fetcher,
    robots: Arc<RobotsCache>,
    extractor: Arc<dyn Extractor>,
    workers: Arc<Semaphore>,
}

impl fmt::Debug for Scraper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scraper")
            .field("settings", &self.settings)
            .field("fetcher", &self.fetcher)
            .field("robots", &self.robots)
            .finish_non_exhaustive()
    }
}

impl Scraper {
    /// Creates a new scraper
    ///
    /// # Arguments
    ///
    /// * `settings` - Seed URLs and politeness settings
    /// * `fetch_config` - Transport, pacing and retry configuration
    /// * `extractor` - Turns fetched pages into records
    pub fn new(
        settings: ScrapeSettings,
        fetch_config: FetchConfig,
        extractor: Arc<dyn Extractor>,
    ) -> Result<Self, ScrapeError> {
        let fetcher = Fetcher::new(&fetch_config)?;
        let robots = RobotsCache::new(&fetch_config)?;
        let workers = Arc::new(Semaphore::new(settings.max_concurrent_urls.max(1)));

        Ok(Self {
            settings: Arc::new(settings),
            fetcher,
            robots: Arc::new(robots),
            extractor,
            workers,
        })
    }

    pub fn settings(&self) -> &ScrapeSettings {
        &self.settings
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn robots(&self) -> &RobotsCache {
        &self.robots
    }

    /// Scrapes a single URL and returns its records
    pub async fn scrape_url(&self, url: &str) -> Vec<Record> {
        self.scrape_url_report(url).await.records
    }

    /// Scrapes a single URL and reports what happened
    ///
    /// Never fails; every error is folded into the report's outcome.
    pub async fn scrape_url_report(&self, url: &str) -> UrlReport {
        let report = self.process_url(url).await;

        match &report.outcome {
            UrlOutcome::Extracted(n) => tracing::info!("Extracted {} records from {}", n, url),
            UrlOutcome::Disallowed => tracing::warn!("URL {} disallowed by robots.txt", url),
            UrlOutcome::HttpStatus(status) => {
                tracing::warn!("Skipping {} after HTTP status {}", url, status)
            }
            UrlOutcome::Failed(reason) => tracing::error!("Error scraping {}: {}", url, reason),
        }

        report
    }

    /// Performs the per-URL sequence: robots check, delay, fetch, extract
    async fn process_url(&self, url: &str) -> UrlReport {
        let parsed = match parse_http_url(url) {
            Ok(parsed) => parsed,
            Err(e) => return UrlReport::empty(url, UrlOutcome::Failed(e.to_string())),
        };
        let domain = match domain_key(&parsed) {
            Ok(domain) => domain,
            Err(e) => return UrlReport::empty(url, UrlOutcome::Failed(e.to_string())),
        };

        let min_delay = Duration::from_millis(self.settings.min_delay_ms);

        let crawl_delay = if self.settings.respect_robots {
            if !self.robots.is_allowed(parsed.as_str()).await {
                return UrlReport::empty(url, UrlOutcome::Disallowed);
            }
            self.robots.crawl_delay(&domain).await.max(min_delay)
        } else {
            min_delay
        };

        tracing::debug!("Fetching {} with crawl delay {:?}", url, crawl_delay);

        let response = match self.fetcher.fetch_url(&parsed, crawl_delay).await {
            Ok(response) => response,
            Err(e) => return UrlReport::empty(url, UrlOutcome::Failed(e.to_string())),
        };

        if !response.is_success() {
            return UrlReport::empty(url, UrlOutcome::HttpStatus(response.status_code()));
        }

        let records = self.extractor.extract(&response.body, &response.url);
        UrlReport {
            url: url.to_string(),
            outcome: UrlOutcome::Extracted(records.len()),
            records,
        }
    }

    /// Scrapes many URLs concurrently and reports on each, in input order
    pub async fn scrape_urls_report(&self, urls: &[String]) -> Vec<UrlReport> {
        let start_time = Instant::now();

        let handles: Vec<_> = urls
            .iter()
            .map(|url| {
                let scraper = self.clone();
                let url = url.clone();
                tokio::spawn(async move {
                    let _worker = match Arc::clone(&scraper.workers).acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => {
                            return UrlReport::empty(
                                &url,
                                UrlOutcome::Failed("worker pool closed".to_string()),
                            )
                        }
                    };
                    scraper.scrape_url_report(&url).await
                })
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for (url, handle) in urls.iter().zip(handles) {
            let report = match handle.await {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!("Scrape task for {} did not complete: {}", url, e);
                    UrlReport::empty(url, UrlOutcome::Failed(e.to_string()))
                }
            };
            reports.push(report);
        }

        let successful = reports.iter().filter(|r| r.outcome.is_success()).count();
        tracing::info!(
            "Scraped {} URLs ({} successful) in {:?}",
            reports.len(),
            successful,
            start_time.elapsed()
        );

        reports
    }

    /// Scrapes many URLs concurrently and concatenates their records in input order
    pub async fn scrape_urls(&self, urls: &[String]) -> Vec<Record> {
        self.scrape_urls_report(urls)
            .await
            .into_iter()
            .flat_map(|report| report.records)
            .collect()
    }

    /// Returns the configured seed URLs, capped at `max_pages`
    pub fn seed_urls(&self) -> &[String] {
        let urls = &self.settings.urls;
        match self.settings.max_pages {
            Some(max) if urls.len() > max => {
                tracing::warn!(
                    "Limiting run to {} of {} URLs (max-pages)",
                    max,
                    urls.len()
                );
                &urls[..max]
            }
            _ => urls.as_slice(),
        }
    }

    /// Scrapes the configured seed URLs
    pub async fn run(&self) -> Vec<UrlReport> {
        let urls = self.seed_urls().to_vec();
        tracing::info!("Starting scrape of {} URLs", urls.len());
        self.scrape_urls_report(&urls).await
    }
}
