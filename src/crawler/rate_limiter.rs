//! Per-domain request pacing
//!
//! Each domain owns a `DomainPacingState` behind its own async mutex. A caller
//! holds that mutex across the whole check, sleep and record sequence, so two
//! tasks targeting the same domain can never both observe "enough time has
//! passed" and start together. Distinct domains never contend.

use crate::state::DomainPacingState;
use crate::url::DomainKey;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::Mutex as AsyncMutex;

/// Enforces a minimum gap between request starts to the same domain
#[derive(Debug, Default)]
pub struct RateLimiter {
    domains: Mutex<HashMap<DomainKey, Arc<AsyncMutex<DomainPacingState>>>>,
}

impl RateLimiter {
    /// Creates a rate limiter with no tracked domains
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the pacing slot for a domain, creating it on first use
    fn slot(&self, domain: &DomainKey) -> Arc<AsyncMutex<DomainPacingState>> {
        let mut domains = self.domains.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(domains.entry(domain.clone()).or_default())
    }

    /// Waits until `min_delay` has elapsed since the last request start for
    /// `domain`, then records the current time as the new request start
    ///
    /// The first request to a domain never waits. Returns the time spent waiting.
    ///
    /// # Arguments
    ///
    /// * `domain` - The domain about to be requested
    /// * `min_delay` - Minimum gap between request starts
    pub async fn wait_turn(&self, domain: &DomainKey, min_delay: Duration) -> Duration {
        let slot = self.slot(domain);
        let mut state = slot.lock().await;

        let waited = match state.time_until_next_request(min_delay, Instant::now()) {
            Some(wait) => {
                tracing::debug!("Rate limiting: sleeping {:?} for domain {}", wait, domain);
                tokio::time::sleep(wait).await;
                wait
            }
            None => Duration::ZERO,
        };

        state.record_request(Instant::now());
        waited
    }

    /// Returns the number of requests started against a domain
    pub async fn request_count(&self, domain: &DomainKey) -> u64 {
        let slot = {
            let domains = self.domains.lock().unwrap_or_else(PoisonError::into_inner);
            domains.get(domain).cloned()
        };

        match slot {
            Some(slot) => slot.lock().await.request_count,
            None => 0,
        }
    }

    /// Returns the number of domains with pacing state
    pub fn tracked_domains(&self) -> usize {
        self.domains
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
