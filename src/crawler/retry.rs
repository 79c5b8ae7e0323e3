//! Retry with exponential backoff
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | HTTP 2xx | Return immediately |
//! | HTTP 3xx | Return immediately (redirects are followed by the client) |
//! | HTTP 4xx | Return immediately, no retry |
//! | HTTP 5xx, retries left | Retry after backoff or `Retry-After` seconds |
//! | HTTP 5xx, retries exhausted | Return the last response |
//! | Transport error, retries left | Retry after backoff |
//! | Transport error, retries exhausted | `FetchError::Transport` |
//!
//! Backoff before retry *k* (0-based) is `base * 2^k`: 1s, 2s, 4s by default.

use crate::crawler::fetcher::FetchResponse;
use crate::{FetchError, FetchResult};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Retry schedule for a single URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt
    pub max_retries: u32,

    /// Backoff before the first retry
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Backoff multiplier between consecutive retries
    pub const MULTIPLIER: u32 = 2;

    /// Total number of attempts, including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Computed backoff before retry number `retry` (0-based)
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = Self::MULTIPLIER.saturating_pow(retry);
        self.base_backoff.saturating_mul(factor)
    }
}

/// Classification of an HTTP status for retry purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseClass {
    Success,
    Redirect,
    ClientError,
    ServerError,
    /// Anything outside 200..600
    Other,
}

impl ResponseClass {
    /// Returns true if a request with this outcome is worth repeating
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ServerError)
    }
}

/// Classifies a status code
pub fn classify_status(status: u16) -> ResponseClass {
    match status {
        200..=299 => ResponseClass::Success,
        300..=399 => ResponseClass::Redirect,
        400..=499 => ResponseClass::ClientError,
        500..=599 => ResponseClass::ServerError,
        _ => ResponseClass::Other,
    }
}

/// Parses a `Retry-After` header value given in whole seconds
///
/// HTTP-date values and anything else that is not a non-negative integer
/// yield `None`, and the caller falls back to the computed backoff.
pub fn parse_retry_after(header_value: Option<&str>) -> Option<Duration> {
    let seconds: u64 = header_value?.trim().parse().ok()?;
    Some(Duration::from_secs(seconds))
}

/// Performs GET requests with the retry schedule of a `RetryPolicy`
#[derive(Debug, Clone)]
pub struct RetryEngine {
    client: Client,
    policy: RetryPolicy,
}

impl RetryEngine {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches a URL, retrying server errors and transport failures
    ///
    /// A 5xx response that survives every retry is returned as a response,
    /// not as an error; callers must check the status.
    pub async fn fetch_with_retry(&self, url: &Url) -> FetchResult<FetchResponse> {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match self.perform_request(url, attempt).await {
                Ok(response) => {
                    let status = response.status_code();

                    let class = classify_status(status);

                    if !class.is_retryable() {
                        match class {
                            ResponseClass::Success => {
                                tracing::debug!("Successfully fetched URL: {} (status: {})", url, status)
                            }
                            ResponseClass::Redirect => {
                                tracing::debug!("Redirect response for URL: {} (status: {})", url, status)
                            }
                            ResponseClass::ClientError => {
                                tracing::warn!("Client error for URL: {} (status: {})", url, status)
                            }
                            _ => tracing::warn!("Unexpected status for URL: {} (status: {})", url, status),
                        }
                        return Ok(response);
                    }

                    if attempt >= max_attempts {
                        tracing::error!("Max retries exceeded for URL: {} (status: {})", url, status);
                        return Ok(response);
                    }

                    let computed = self.policy.backoff_for(attempt - 1);
                    let retry_after = response.header("retry-after");
                    let delay = match parse_retry_after(retry_after) {
                        Some(delay) => {
                            tracing::debug!("Using Retry-After header: {:?}", delay);
                            delay
                        }
                        None => {
                            if let Some(value) = retry_after {
                                tracing::debug!("Invalid Retry-After header: {}", value);
                            }
                            computed
                        }
                    };

                    tracing::warn!(
                        "Server error for URL: {} (status: {}), retrying in {:?} (attempt {}/{})",
                        url,
                        status,
                        delay,
                        attempt,
                        self.policy.max_retries
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                Err(error) => error,
            };

            if attempt >= max_attempts {
                tracing::error!("Max retries exceeded for URL: {}: {}", url, error);
                return Err(FetchError::Transport {
                    url: url.to_string(),
                    attempts: attempt,
                    source: error,
                });
            }

            let delay = self.policy.backoff_for(attempt - 1);
            tracing::warn!(
                "Error fetching URL: {}, retrying in {:?} (attempt {}/{}): {}",
                url,
                delay,
                attempt,
                self.policy.max_retries,
                error
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Sends one GET request and reads the full body
    async fn perform_request(&self, url: &Url, attempt: u32) -> Result<FetchResponse, reqwest::Error> {
        let response = self.client.get(url.clone()).send().await?;
        FetchResponse::read(response, attempt).await
    }
}
