//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//!
//! | robots.txt response | Cached rule set |
//! |---------------------|-----------------|
//! | 2xx | Parsed body |
//! | 4xx | Allow all |
//! | 5xx or any other status | Disallow all (until the cache is cleared) |
//! | Network error or unreadable body | Allow all |

mod cache;
mod parser;

pub use cache::{CachedRobots, RobotsCache};
pub use parser::{agent_product_token, RobotsRuleSet};

use crate::url::DomainKey;
use reqwest::Client;

/// Fetches and interprets robots.txt for a domain
///
/// Never fails; every error is mapped to a rule set per the table above.
///
/// # Arguments
///
/// * `client` - The HTTP client to use (carries the user agent and timeout)
/// * `domain` - The domain whose robots.txt is fetched
pub async fn fetch_robots_rules(client: &Client, domain: &DomainKey) -> RobotsRuleSet {
    let robots_url = domain.robots_url();
    tracing::debug!("Fetching robots.txt from {}", robots_url);

    let response = match client.get(&robots_url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Error fetching robots.txt for {}: {}", domain, e);
            return RobotsRuleSet::allow_all();
        }
    };

    let status = response.status();

    if status.is_success() {
        match response.text().await {
            Ok(body) => RobotsRuleSet::from_content(&body),
            Err(e) => {
                tracing::warn!("Error reading robots.txt for {}: {}", domain, e);
                RobotsRuleSet::allow_all()
            }
        }
    } else if status.is_client_error() {
        tracing::debug!(
            "No robots.txt for {} (status: {}), allowing all",
            domain,
            status
        );
        RobotsRuleSet::allow_all()
    } else {
        tracing::warn!(
            "robots.txt for {} returned status {}, disallowing all",
            domain,
            status
        );
        RobotsRuleSet::disallow_all()
    }
}
