//! Fetch orchestration
//!
//! This module contains the politeness-aware fetch core:
//! - Per-domain pacing (`RateLimiter`)
//! - Per-domain in-flight caps (`ConcurrencyGate`)
//! - Retry with exponential backoff and `Retry-After` (`RetryEngine`)
//! - The composed single-URL fetch (`Fetcher`)
//! - Robots-aware fan-out over many URLs with extraction (`Scraper`)

mod concurrency;
mod coordinator;
mod fetcher;
mod rate_limiter;
mod retry;

pub use concurrency::{ConcurrencyGate, DomainPermit};
pub use coordinator::{Scraper, UrlOutcome, UrlReport};
pub use fetcher::{build_http_client, FetchResponse, Fetcher};
pub use rate_limiter::RateLimiter;
pub use retry::{classify_status, parse_retry_after, ResponseClass, RetryEngine, RetryPolicy};
