//! Shared helpers for the integration tests

use polite_scraper::config::{FetchConfig, ScrapeSettings};
use polite_scraper::{Extractor, Record};
use std::sync::Mutex;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// User agent whose robots.txt product token is `TestBot`
pub const TEST_USER_AGENT: &str = "TestBot/1.0 (+https://example.com/bot)";

/// Fetch configuration with short backoffs and delays for testing
pub fn fetch_config() -> FetchConfig {
    FetchConfig {
        user_agent: TEST_USER_AGENT.to_string(),
        connect_timeout_ms: 2_000,
        request_timeout_ms: 5_000,
        robots_timeout_ms: 2_000,
        base_backoff_ms: 20,
        default_crawl_delay_ms: 10,
        ..FetchConfig::default()
    }
}

/// Scrape settings with a very short minimum delay
pub fn scrape_settings(urls: Vec<String>) -> ScrapeSettings {
    ScrapeSettings {
        urls,
        min_delay_ms: 10,
        ..ScrapeSettings::default()
    }
}

/// Mounts a robots.txt response on the server
pub async fn mount_robots(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Mounts an HTML page on the server
pub async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Extractor that remembers every body it was given
#[derive(Debug, Default)]
pub struct RecordingExtractor {
    pub bodies: Mutex<Vec<String>>,
}

impl RecordingExtractor {
    pub fn bodies(&self) -> Vec<String> {
        self.bodies.lock().unwrap().clone()
    }
}

impl Extractor for RecordingExtractor {
    fn extract(&self, html: &str, base_url: &Url) -> Vec<Record> {
        self.bodies.lock().unwrap().push(html.to_string());
        vec![Record {
            url: Some(base_url.to_string()),
            ..Record::default()
        }]
    }
}
