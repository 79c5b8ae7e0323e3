//! Configuration module for Polite-Scraper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section and key is optional; missing values fall back to the defaults
//! (2 requests per domain, 3 retries, 1s backoff, 1s crawl delay, 10s connect
//! and 30s request timeouts).
//!
//! # Example
//!
//! ```no_run
//! use polite_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scraper.toml")).unwrap();
//! println!("Per-domain cap: {}", config.fetch.domain_concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetchConfig, OutputConfig, ScrapeSettings, DEFAULT_USER_AGENT};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
