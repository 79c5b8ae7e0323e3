//! Integration tests for the scraper
//!
//! These tests use wiremock to create mock HTTP servers and exercise the
//! fetch core, the robots cache and the full scrape cycle end-to-end.

mod common;
mod fetch_tests;
mod robots_tests;
