//! Fetcher tests: retries, backoff, pacing and per-domain concurrency

use crate::common::fetch_config;
use polite_scraper::config::FetchConfig;
use polite_scraper::{FetchError, Fetcher};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_always_503_stops_after_four_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(&fetch_config()).unwrap();
    let url = format!("{}/flaky", mock_server.uri());

    let response = fetcher
        .fetch(&url, Duration::ZERO)
        .await
        .expect("exhausted 5xx retries should return the last response");

    assert_eq!(response.status_code(), 503);
    assert_eq!(response.attempts, 4);
    assert!(!response.is_success());
}

#[tokio::test]
async fn test_backoff_grows_between_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .expect(4)
        .mount(&mock_server)
        .await;

    let config = FetchConfig {
        base_backoff_ms: 50,
        ..fetch_config()
    };
    let fetcher = Fetcher::new(&config).unwrap();

    let start = Instant::now();
    let response = fetcher
        .fetch(&format!("{}/down", mock_server.uri()), Duration::ZERO)
        .await
        .unwrap();

    // 50 + 100 + 200
    assert!(start.elapsed() >= Duration::from_millis(350));
    assert_eq!(response.status_code(), 500);
}

#[tokio::test]
async fn test_retry_after_header_overrides_backoff() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(503).insert_header("Retry-After", "2"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(&fetch_config()).unwrap();

    let start = Instant::now();
    let response = fetcher
        .fetch(&format!("{}/busy", mock_server.uri()), Duration::ZERO)
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.body, "ok");
    assert_eq!(response.attempts, 2);
    assert!(elapsed >= Duration::from_millis(1_950), "waited only {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(10));
}

#[tokio::test]
async fn test_malformed_retry_after_uses_backoff() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(503).insert_header("Retry-After", "later"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(&fetch_config()).unwrap();

    let start = Instant::now();
    let response = fetcher
        .fetch(&format!("{}/busy", mock_server.uri()), Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(response.status_code(), 200);
    assert!(start.elapsed() < Duration::from_millis(1_500));
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(&fetch_config()).unwrap();
    let response = fetcher
        .fetch(&format!("{}/missing", mock_server.uri()), Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(response.status_code(), 404);
    assert_eq!(response.attempts, 1);
}

#[tokio::test]
async fn test_redirect_is_followed_by_transport() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("Location", format!("{}/new", mock_server.uri()).as_str()),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(&fetch_config()).unwrap();
    let response = fetcher
        .fetch(&format!("{}/old", mock_server.uri()), Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.url.path(), "/new");
    assert_eq!(response.body, "moved");
}

#[tokio::test]
async fn test_not_modified_is_returned_without_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cached"))
        .respond_with(ResponseTemplate::new(304))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(&fetch_config()).unwrap();
    let response = fetcher
        .fetch(&format!("{}/cached", mock_server.uri()), Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(response.status_code(), 304);
    assert_eq!(response.attempts, 1);
    assert!(!response.is_success());
}

#[tokio::test]
async fn test_transport_failure_after_retries() {
    let config = FetchConfig {
        base_backoff_ms: 10,
        connect_timeout_ms: 500,
        request_timeout_ms: 1_000,
        ..fetch_config()
    };
    let fetcher = Fetcher::new(&config).unwrap();

    // Nothing listens on the discard port
    let result = fetcher.fetch("http://127.0.0.1:9/page", Duration::ZERO).await;

    match result {
        Err(FetchError::Transport { attempts, .. }) => assert_eq!(attempts, 4),
        other => panic!("expected transport failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_consecutive_fetches_respect_crawl_delay() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(&fetch_config()).unwrap();
    let delay = Duration::from_millis(300);

    let start = Instant::now();
    for page in ["/a", "/b", "/c"] {
        fetcher
            .fetch(&format!("{}{}", mock_server.uri(), page), delay)
            .await
            .unwrap();
    }

    // First request is immediate, the next two each wait the delay
    assert!(start.elapsed() >= Duration::from_millis(600));
}

#[tokio::test]
async fn test_concurrent_same_domain_fetches_are_paced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(&fetch_config()).unwrap();
    let delay = Duration::from_millis(200);

    let start = Instant::now();
    let handles: Vec<_> = (0..3)
        .map(|i| {
            let fetcher = fetcher.clone();
            let url = format!("{}/p{}", mock_server.uri(), i);
            tokio::spawn(async move { fetcher.fetch(&url, delay).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    assert!(start.elapsed() >= Duration::from_millis(400));
}

#[tokio::test]
async fn test_domain_concurrency_cap() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = FetchConfig {
        domain_concurrency: 2,
        ..fetch_config()
    };
    let fetcher = Fetcher::new(&config).unwrap();

    let start = Instant::now();
    let handles: Vec<_> = (0..3)
        .map(|i| {
            let fetcher = fetcher.clone();
            let url = format!("{}/slow{}", mock_server.uri(), i);
            tokio::spawn(async move { fetcher.fetch(&url, Duration::ZERO).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    // With two permits the third request can only start after one finishes
    assert!(start.elapsed() >= Duration::from_millis(600));

    let domain = polite_scraper::domain_key(&url::Url::parse(&mock_server.uri()).unwrap()).unwrap();
    assert_eq!(fetcher.concurrency_gate().available_permits(&domain), 2);
}

#[tokio::test]
async fn test_slow_domain_does_not_block_other_domains() {
    let slow_server = MockServer::start().await;
    let fast_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&slow_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&fast_server)
        .await;

    let config = FetchConfig {
        domain_concurrency: 1,
        ..fetch_config()
    };
    let fetcher = Fetcher::new(&config).unwrap();

    let slow_fetcher = fetcher.clone();
    let slow_url = format!("{}/slow", slow_server.uri());
    let slow = tokio::spawn(async move { slow_fetcher.fetch(&slow_url, Duration::ZERO).await });

    // Give the slow request time to take its domain's only permit
    tokio::time::sleep(Duration::from_millis(100)).await;

    let start = Instant::now();
    let response = fetcher
        .fetch(&format!("{}/fast", fast_server.uri()), Duration::ZERO)
        .await
        .unwrap();
    assert_eq!(response.status_code(), 200);
    assert!(start.elapsed() < Duration::from_secs(1));

    assert!(slow.await.unwrap().is_ok());
}
