//! Run statistics aggregated from per-URL reports
//!
//! The scraper never fails a batch as a whole; this module turns the per-URL
//! outcomes into the counts a caller needs to judge the run.

use crate::crawler::{UrlOutcome, UrlReport};
use std::collections::BTreeMap;

/// Scrape run statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeStatistics {
    /// Number of URLs processed
    pub total_urls: u64,

    /// URLs fetched with a 2xx status and handed to extraction
    pub urls_extracted: u64,

    /// URLs skipped because robots.txt disallows them
    pub urls_disallowed: u64,

    /// Count of non-2xx final responses by status code
    pub http_errors: BTreeMap<u16, u64>,

    /// URLs that failed before a response was obtained
    pub urls_failed: u64,

    /// Total records extracted
    pub total_records: u64,
}

impl ScrapeStatistics {
    /// Aggregates statistics from a batch of reports
    pub fn from_reports(reports: &[UrlReport]) -> Self {
        let mut stats = Self::default();
        for report in reports {
            stats.record(report);
        }
        stats
    }

    /// Adds one report to the totals
    pub fn record(&mut self, report: &UrlReport) {
        self.total_urls += 1;
        self.total_records += report.records.len() as u64;

        match &report.outcome {
            UrlOutcome::Extracted(_) => self.urls_extracted += 1,
            UrlOutcome::Disallowed => self.urls_disallowed += 1,
            UrlOutcome::HttpStatus(status) => {
                *self.http_errors.entry(*status).or_insert(0) += 1;
            }
            UrlOutcome::Failed(_) => self.urls_failed += 1,
        }
    }

    /// Number of URLs whose outcome was not a successful extraction
    pub fn unsuccessful_urls(&self) -> u64 {
        self.total_urls - self.urls_extracted
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_urls == 0 {
            return 0.0;
        }
        (self.urls_extracted as f64 / self.total_urls as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &ScrapeStatistics) {
    println!("=== Scrape Statistics ===\n");

    println!("Overview:");
    println!("  URLs processed: {}", stats.total_urls);
    println!("  Records extracted: {}", stats.total_records);
    println!("  Success rate: {:.1}%", stats.success_rate());
    println!();

    println!("Outcomes:");
    println!("  Extracted: {}", stats.urls_extracted);
    println!("  Disallowed by robots.txt: {}", stats.urls_disallowed);
    println!("  Failed: {}", stats.urls_failed);

    if !stats.http_errors.is_empty() {
        println!();
        println!("HTTP Errors:");
        for (status, count) in &stats.http_errors {
            println!("  {}: {}", status, count);
        }
    }
}
