//! Robots.txt parser implementation
//!
//! This module provides functionality for parsing robots.txt content using the robotstxt crate.

use robotstxt::DefaultMatcher;

/// Body used for a rule set that blocks every path for every agent
const DISALLOW_ALL_BODY: &str = "User-agent: *\nDisallow: /\n";

/// Parsed robots.txt rules for one domain
///
/// This is a wrapper around the robotstxt crate's matcher, providing a simplified
/// interface for checking if URLs are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotsRuleSet {
    /// Raw robots.txt content (empty string means allow all)
    content: String,
}

impl RobotsRuleSet {
    /// Creates a rule set from raw robots.txt content
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// Creates an empty rule set that allows everything
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
        }
    }

    /// Creates a rule set that disallows every path for every agent
    pub fn disallow_all() -> Self {
        Self::from_content(DISALLOW_ALL_BODY)
    }

    /// Returns true if the rule set has no content at all
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Checks if a URL is allowed for the given agent
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL to check
    /// * `agent_token` - The product token of the user agent (e.g. "PoliteScraper")
    ///
    /// # Returns
    ///
    /// * `true` - If the URL is allowed
    /// * `false` - If the URL is disallowed
    pub fn is_allowed(&self, url: &str, agent_token: &str) -> bool {
        if self.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, agent_token, url)
    }

    /// Gets the crawl delay for a specific agent
    ///
    /// A group naming the agent wins over the `*` group. Consecutive
    /// `User-agent` lines share one group; the first other directive closes
    /// the list of agents for that group.
    ///
    /// # Returns
    ///
    /// * `Some(f64)` - The crawl delay in seconds
    /// * `None` - If no crawl delay applies
    pub fn crawl_delay(&self, agent_token: &str) -> Option<f64> {
        if self.is_empty() {
            return None;
        }

        let normalized_agent = agent_token.to_lowercase();

        let mut group_agents: Vec<String> = Vec::new();
        let mut in_agent_list = false;
        let mut delay_for_wildcard: Option<f64> = None;
        let mut delay_for_agent: Option<f64> = None;

        for line in self.content.lines() {
            // Strip trailing comments
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if !in_agent_list {
                        group_agents.clear();
                        in_agent_list = true;
                    }
                    group_agents.push(agent_product_token(value).to_lowercase());
                }
                "crawl-delay" => {
                    in_agent_list = false;

                    let Ok(delay) = value.parse::<f64>() else {
                        tracing::debug!("Ignoring malformed Crawl-delay value: {}", value);
                        continue;
                    };
                    if !delay.is_finite() || delay < 0.0 {
                        continue;
                    }

                    if group_agents.iter().any(|ua| *ua == normalized_agent) {
                        delay_for_agent.get_or_insert(delay);
                    } else if group_agents.iter().any(|ua| ua == "*") {
                        delay_for_wildcard.get_or_insert(delay);
                    }
                }
                _ => {
                    in_agent_list = false;
                }
            }
        }

        delay_for_agent.or(delay_for_wildcard)
    }
}

/// Returns the product token of a user agent string
///
/// The product token is the text before the first `/` or whitespace, which
/// is what robots.txt `User-agent` lines are matched against.
///
/// # Example
///
/// ```
/// use polite_scraper::robots::agent_product_token;
///
/// assert_eq!(agent_product_token("PoliteScraper/1.0 (+https://example.com)"), "PoliteScraper");
/// ```
pub fn agent_product_token(user_agent: &str) -> &str {
    let trimmed = user_agent.trim();
    let end = trimmed
        .find(|c: char| c == '/' || c.is_whitespace())
        .unwrap_or(trimmed.len());
    &trimmed[..end]
}
