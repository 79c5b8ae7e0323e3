//! Robots.txt caching implementation
//!
//! Each domain's rules are fetched once, on first access, and kept until the
//! cache is cleared. Concurrent first callers for one domain share a single
//! fetch through a per-domain `OnceCell`.

use crate::config::FetchConfig;
use crate::robots::{agent_product_token, fetch_robots_rules, RobotsRuleSet};
use crate::url::{domain_key, parse_http_url, DomainKey};
use crate::{FetchError, FetchResult};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::OnceCell;

/// Cached robots.txt rules for a domain
///
/// This structure stores the rule set along with the timestamp when it was
/// fetched. Entries never expire; the timestamp is kept for diagnostics.
#[derive(Debug, Clone)]
pub struct CachedRobots {
    /// The parsed robots.txt rules
    pub rules: RobotsRuleSet,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    /// Creates a new CachedRobots instance stamped with the current time
    pub fn new(rules: RobotsRuleSet) -> Self {
        Self {
            rules,
            fetched_at: Utc::now(),
        }
    }

    /// Returns how long ago the robots.txt was fetched
    pub fn age(&self) -> ChronoDuration {
        Utc::now() - self.fetched_at
    }
}

type CacheSlot = Arc<OnceCell<CachedRobots>>;

/// Lazily populated per-domain robots.txt cache
#[derive(Debug)]
pub struct RobotsCache {
    client: Client,
    agent_token: String,
    default_crawl_delay_ms: u64,
    entries: Mutex<HashMap<DomainKey, CacheSlot>>,
}

impl RobotsCache {
    /// Creates a cache with its own short-timeout client
    pub fn new(config: &FetchConfig) -> FetchResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.robots_timeout())
            .connect_timeout(config.connect_timeout())
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            agent_token: agent_product_token(&config.user_agent).to_string(),
            default_crawl_delay_ms: config.default_crawl_delay_ms,
            entries: Mutex::new(HashMap::new()),
        })
    }

    /// The product token matched against `User-agent` lines
    pub fn agent_token(&self) -> &str {
        &self.agent_token
    }

    fn slot(&self, domain: &DomainKey) -> CacheSlot {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(domain.clone()).or_default())
    }

    /// Returns the cached rules for a domain, fetching them on first access
    pub async fn rules_for(&self, domain: &DomainKey) -> CachedRobots {
        let slot = self.slot(domain);
        slot.get_or_init(|| async {
            tracing::debug!("Robots cache miss for domain {}", domain);
            let rules = fetch_robots_rules(&self.client, domain).await;
            CachedRobots::new(rules)
        })
        .await
        .clone()
    }

    /// Checks if a URL may be fetched under its domain's robots.txt
    ///
    /// URLs that cannot be parsed are reported as allowed.
    pub async fn is_allowed(&self, url: &str) -> bool {
        let parsed = match parse_http_url(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Error checking robots.txt for {}: {}", url, e);
                return true;
            }
        };
        let domain = match domain_key(&parsed) {
            Ok(domain) => domain,
            Err(e) => {
                tracing::warn!("Error checking robots.txt for {}: {}", url, e);
                return true;
            }
        };

        let cached = self.rules_for(&domain).await;
        let allowed = cached.rules.is_allowed(parsed.as_str(), &self.agent_token);
        if !allowed {
            tracing::debug!("URL {} disallowed by robots.txt", url);
        }
        allowed
    }

    /// Crawl delay for a domain in milliseconds
    ///
    /// Uses a positive robots.txt `Crawl-delay`, otherwise the configured default.
    pub async fn crawl_delay_ms(&self, domain: &DomainKey) -> u64 {
        let cached = self.rules_for(domain).await;
        match cached.rules.crawl_delay(&self.agent_token) {
            Some(seconds) if seconds > 0.0 => (seconds * 1000.0).round() as u64,
            _ => self.default_crawl_delay_ms,
        }
    }

    /// Crawl delay for a domain as a `Duration`
    pub async fn crawl_delay(&self, domain: &DomainKey) -> Duration {
        Duration::from_millis(self.crawl_delay_ms(domain).await)
    }

    /// Drops every cached rule set
    pub fn clear_cache(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!("Clearing {} cached robots.txt entries", entries.len());
        entries.clear();
    }

    /// Number of domains with cached rules
    pub fn cache_size(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }
}
