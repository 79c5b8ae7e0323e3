//! URL handling module for Polite-Scraper
//!
//! This module provides URL validation and the domain key used to index every
//! piece of per-site state (pacing, concurrency permits, robots rules).

mod domain;

pub use domain::{domain_key, parse_http_url, DomainKey};
