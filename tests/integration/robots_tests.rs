//! Robots cache tests: status handling, crawl delays and cache idempotence

use crate::common::{fetch_config, mount_robots};
use polite_scraper::{domain_key, DomainKey, RobotsCache};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn server_domain(server: &MockServer) -> DomainKey {
    domain_key(&Url::parse(&server.uri()).unwrap()).unwrap()
}

#[tokio::test]
async fn test_robots_404_allows_everything() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, 404, "").await;

    let cache = RobotsCache::new(&fetch_config()).unwrap();
    let base = mock_server.uri();

    assert!(cache.is_allowed(&format!("{}/", base)).await);
    assert!(cache.is_allowed(&format!("{}/private/data", base)).await);
    assert!(cache.is_allowed(&format!("{}/admin?x=1", base)).await);
}

#[tokio::test]
async fn test_robots_500_denies_until_cleared() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /\n"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let cache = RobotsCache::new(&fetch_config()).unwrap();
    let page = format!("{}/page", mock_server.uri());

    assert!(!cache.is_allowed(&page).await);
    // Still denied: the failure is cached, not re-fetched
    assert!(!cache.is_allowed(&format!("{}/other", mock_server.uri())).await);

    cache.clear_cache();
    assert_eq!(cache.cache_size(), 0);

    assert!(cache.is_allowed(&page).await);
}

#[tokio::test]
async fn test_crawl_delay_from_robots() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, 200, "User-agent: *\nCrawl-delay: 5\n").await;

    let cache = RobotsCache::new(&fetch_config()).unwrap();
    let domain = server_domain(&mock_server);

    assert_eq!(cache.crawl_delay_ms(&domain).await, 5_000);
    assert_eq!(
        cache.crawl_delay(&domain).await,
        std::time::Duration::from_secs(5)
    );
}

#[tokio::test]
async fn test_crawl_delay_defaults_without_directive() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, 200, "User-agent: *\nDisallow: /tmp\n").await;

    let cache = RobotsCache::new(&fetch_config()).unwrap();
    let domain = server_domain(&mock_server);

    assert_eq!(
        cache.crawl_delay_ms(&domain).await,
        fetch_config().default_crawl_delay_ms
    );
}

#[tokio::test]
async fn test_zero_crawl_delay_falls_back_to_default() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, 200, "User-agent: *\nCrawl-delay: 0\n").await;

    let cache = RobotsCache::new(&fetch_config()).unwrap();

    assert_eq!(
        cache.crawl_delay_ms(&server_domain(&mock_server)).await,
        fetch_config().default_crawl_delay_ms
    );
}

#[tokio::test]
async fn test_agent_specific_crawl_delay() {
    let mock_server = MockServer::start().await;
    mount_robots(
        &mock_server,
        200,
        "User-agent: TestBot\nCrawl-delay: 1.5\n\nUser-agent: *\nCrawl-delay: 10\n",
    )
    .await;

    let cache = RobotsCache::new(&fetch_config()).unwrap();
    assert_eq!(cache.crawl_delay_ms(&server_domain(&mock_server)).await, 1_500);
}

#[tokio::test]
async fn test_robots_fetched_once_per_domain() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let cache = RobotsCache::new(&fetch_config()).unwrap();
    let base = mock_server.uri();
    let domain = server_domain(&mock_server);

    assert!(cache.is_allowed(&format!("{}/public", base)).await);
    assert!(!cache.is_allowed(&format!("{}/private/a", base)).await);
    cache.crawl_delay_ms(&domain).await;

    assert_eq!(cache.cache_size(), 1);
}

#[tokio::test]
async fn test_concurrent_first_lookups_share_one_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: *\nAllow: /\n")
                .set_delay(std::time::Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let cache = std::sync::Arc::new(RobotsCache::new(&fetch_config()).unwrap());

    let handles: Vec<_> = (0..5)
        .map(|i| {
            let cache = std::sync::Arc::clone(&cache);
            let url = format!("{}/page{}", mock_server.uri(), i);
            tokio::spawn(async move { cache.is_allowed(&url).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap());
    }
}

#[tokio::test]
async fn test_disallow_private_prefix() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, 200, "User-agent: *\nDisallow: /private\n").await;

    let cache = RobotsCache::new(&fetch_config()).unwrap();
    let base = mock_server.uri();

    assert!(!cache.is_allowed(&format!("{}/private/a", base)).await);
    assert!(cache.is_allowed(&format!("{}/public", base)).await);
}

#[tokio::test]
async fn test_rules_for_our_agent() {
    let mock_server = MockServer::start().await;
    mount_robots(
        &mock_server,
        200,
        "User-agent: TestBot\nDisallow: /\n\nUser-agent: *\nAllow: /\n",
    )
    .await;

    let cache = RobotsCache::new(&fetch_config()).unwrap();
    assert!(!cache.is_allowed(&format!("{}/anything", mock_server.uri())).await);
}

#[tokio::test]
async fn test_domains_are_cached_separately() {
    let open_server = MockServer::start().await;
    let closed_server = MockServer::start().await;
    mount_robots(&open_server, 404, "").await;
    mount_robots(&closed_server, 200, "User-agent: *\nDisallow: /\n").await;

    let cache = RobotsCache::new(&fetch_config()).unwrap();

    assert!(cache.is_allowed(&format!("{}/x", open_server.uri())).await);
    assert!(!cache.is_allowed(&format!("{}/x", closed_server.uri())).await);
    assert_eq!(cache.cache_size(), 2);
}
