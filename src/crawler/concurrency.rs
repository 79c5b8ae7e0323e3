//! Per-domain concurrency limiting
//!
//! Every domain lazily gets its own semaphore with a fixed number of permits.
//! A slow or stalled domain only exhausts its own permits.

use crate::url::DomainKey;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

/// Default number of simultaneous requests per domain
pub const DEFAULT_DOMAIN_CONCURRENCY: usize = 2;

/// Bounds the number of in-flight requests per domain
#[derive(Debug)]
pub struct ConcurrencyGate {
    permits_per_domain: usize,
    domains: Mutex<HashMap<DomainKey, Arc<Semaphore>>>,
}

/// A held request slot for one domain
///
/// The slot is returned to the domain when the permit is dropped, so it is
/// released on every exit path of the guarded request.
#[derive(Debug)]
pub struct DomainPermit {
    domain: DomainKey,
    _permit: OwnedSemaphorePermit,
}

impl DomainPermit {
    /// The domain this permit belongs to
    pub fn domain(&self) -> &DomainKey {
        &self.domain
    }

    /// Returns the slot to the domain
    pub fn release(self) {
        tracing::trace!("Releasing permit for domain {}", self.domain);
    }
}

impl Default for ConcurrencyGate {
    fn default() -> Self {
        Self::new(DEFAULT_DOMAIN_CONCURRENCY)
    }
}

impl ConcurrencyGate {
    /// Creates a gate allowing `permits_per_domain` in-flight requests per domain
    pub fn new(permits_per_domain: usize) -> Self {
        Self {
            permits_per_domain: permits_per_domain.max(1),
            domains: Mutex::new(HashMap::new()),
        }
    }

    /// The per-domain cap
    pub fn permits_per_domain(&self) -> usize {
        self.permits_per_domain
    }

    /// Returns the semaphore for a domain, creating it on first use
    ///
    /// The map lock is only held to look up the semaphore, never while
    /// waiting for a permit.
    fn semaphore(&self, domain: &DomainKey) -> Arc<Semaphore> {
        let mut domains = self.domains.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            domains
                .entry(domain.clone())
                .or_insert_with(|| Arc::new(Semaphore::new(self.permits_per_domain))),
        )
    }

    /// Waits until a request slot for `domain` is free and takes it
    pub async fn acquire(&self, domain: &DomainKey) -> Result<DomainPermit, AcquireError> {
        let semaphore = self.semaphore(domain);

        if semaphore.available_permits() == 0 {
            tracing::debug!("Waiting for a free request slot on domain {}", domain);
        }

        let permit = semaphore.acquire_owned().await?;
        Ok(DomainPermit {
            domain: domain.clone(),
            _permit: permit,
        })
    }

    /// Returns the number of free request slots for a domain
    pub fn available_permits(&self, domain: &DomainKey) -> usize {
        let domains = self.domains.lock().unwrap_or_else(PoisonError::into_inner);
        domains
            .get(domain)
            .map_or(self.permits_per_domain, |s| s.available_permits())
    }
}
