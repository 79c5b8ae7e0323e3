//! HTTP fetcher implementation
//!
//! This module handles all page requests for the scraper, including:
//! - Building the shared HTTP client
//! - Pacing requests per domain
//! - Bounding in-flight requests per domain
//! - Retrying transient failures

use crate::config::FetchConfig;
use crate::crawler::concurrency::ConcurrencyGate;
use crate::crawler::rate_limiter::RateLimiter;
use crate::crawler::retry::{RetryEngine, RetryPolicy};
use crate::url::{domain_key, parse_http_url};
use crate::{FetchError, FetchResult};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed by the client
pub const MAX_REDIRECTS: usize = 10;

/// A fully read HTTP response
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Final URL after redirects
    pub url: Url,

    pub status: StatusCode,

    pub headers: HeaderMap,

    /// Decoded response body
    pub body: String,

    /// Attempt number that produced this response (1 for the first try)
    pub attempts: u32,
}

impl FetchResponse {
    /// Reads the status, headers and full body of a reqwest response
    pub(crate) async fn read(response: reqwest::Response, attempts: u32) -> Result<Self, reqwest::Error> {
        let url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(Self {
            url,
            status,
            headers,
            body,
            attempts,
        })
    }

    /// Numeric HTTP status
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns true for 2xx responses
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns a header value if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetch configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use polite_scraper::config::FetchConfig;
/// use polite_scraper::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()
}

/// Performs single politeness-aware, retried GET requests
///
/// # Request Flow
///
/// 1. Wait until the domain's pacing delay has elapsed
/// 2. Take one of the domain's concurrency permits
/// 3. Run the retry loop while holding the permit
/// 4. Release the permit on every exit path
///
/// Cloning is cheap; clones share pacing state, permits and the client.
#[derive(Debug, Clone)]
pub struct Fetcher {
    rate_limiter: Arc<RateLimiter>,
    gate: Arc<ConcurrencyGate>,
    retry: RetryEngine,
    user_agent: String,
}

impl Fetcher {
    /// Creates a fetcher with its own client, pacing state and permits
    pub fn new(config: &FetchConfig) -> FetchResult<Self> {
        let client = build_http_client(config).map_err(FetchError::Client)?;
        let policy = RetryPolicy {
            max_retries: config.max_retries,
            base_backoff: config.base_backoff(),
        };

        Ok(Self {
            rate_limiter: Arc::new(RateLimiter::new()),
            gate: Arc::new(ConcurrencyGate::new(config.domain_concurrency)),
            retry: RetryEngine::new(client, policy),
            user_agent: config.user_agent.clone(),
        })
    }

    /// Fetches a URL string after validating it
    ///
    /// Invalid URLs fail before any pacing, permit or network activity.
    pub async fn fetch(&self, url: &str, crawl_delay: Duration) -> FetchResult<FetchResponse> {
        let parsed = parse_http_url(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        self.fetch_url(&parsed, crawl_delay).await
    }

    /// Fetches a parsed URL, pacing against `crawl_delay` for its domain
    pub async fn fetch_url(&self, url: &Url, crawl_delay: Duration) -> FetchResult<FetchResponse> {
        let domain = domain_key(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        self.rate_limiter.wait_turn(&domain, crawl_delay).await;

        let permit = self
            .gate
            .acquire(&domain)
            .await
            .map_err(|_| FetchError::GateClosed(domain.to_string()))?;

        tracing::debug!("Fetching URL: {}", url);
        let result = self.retry.fetch_with_retry(url).await;
        permit.release();

        result
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn concurrency_gate(&self) -> &ConcurrencyGate {
        &self.gate
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        self.retry.policy()
    }
}
