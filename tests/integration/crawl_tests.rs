//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use oda_crawler::config::Config;
use oda_crawler::crawler::{run_crawl, Crawler};
use oda_crawler::state::ResultStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock server
fn create_test_config(base_url: &str, output_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.crawler.base_url = base_url.to_string();
    config.crawler.start_path = "/".to_string();
    config.crawler.max_depth = 2;
    config.crawler.max_concurrent_fetches = 20;
    config.retry.max_attempts = 3;
    config.retry.base_delay_ms = 1; // Very short for testing
    config.retry.max_retry_time_ms = 5_000;
    config.http.timeout_secs = 5;
    config.output.products_path = output_dir
        .path()
        .join("output.json")
        .display()
        .to_string();
    config.output.broken_links_path = output_dir
        .path()
        .join("brokenLinks.json")
        .display()
        .to_string();
    config
}

/// Builds a page body linking to each of `links`
fn page_with_links(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a href="{}">{}</a>"#, link, link))
        .collect();
    format!("<html><body>{}</body></html>", anchors)
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Number of requests the server received for `route`
async fn request_count(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .expect("Request recording is enabled")
        .iter()
        .filter(|request| request.url.path() == route)
        .count()
}

async fn crawl(config: &Config) -> (Arc<Crawler>, Arc<ResultStore>) {
    let store = Arc::new(ResultStore::new());
    let crawler =
        Arc::new(Crawler::new(config, Arc::clone(&store)).expect("Failed to create crawler"));
    crawler.run().await.expect("Crawl failed");
    (crawler, store)
}

#[tokio::test]
async fn test_full_crawl_visits_each_target_once() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/",
        page_with_links(&["/a", "/b", "/products/3215-organic-milk/"]),
    )
    .await;
    mount_page(&mock_server, "/a", page_with_links(&["/", "/b", "/c"])).await;
    mount_page(&mock_server, "/b", page_with_links(&["/a", "/c"])).await;
    mount_page(&mock_server, "/c", page_with_links(&["/a", "/b"])).await;
    mount_page(
        &mock_server,
        "/products/3215-organic-milk/",
        r#"<html><body>
            <h1 itemprop="name">Organic Milk</h1>
            <span class="price" content="45"></span>
            <span itemprop="brand">Tine</span>
            <a href="/a">Back</a>
        </body></html>"#
            .to_string(),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &dir);
    let (crawler, store) = crawl(&config).await;

    for route in ["/", "/a", "/b", "/c", "/products/3215-organic-milk/"] {
        assert_eq!(
            request_count(&mock_server, route).await,
            1,
            "{} should be fetched exactly once",
            route
        );
    }
    assert_eq!(crawler.total_requests(), 5);
    assert_eq!(crawler.pages_fetched(), 5);

    let product = store.product("3215").expect("Product should be extracted");
    assert_eq!(product.name, "Organic Milk");
    assert_eq!(product.price, Some(45));
    assert_eq!(product.brand.as_deref(), Some("Tine"));
    assert!(store.snapshot().broken_links.is_empty());
}

#[tokio::test]
async fn test_not_found_is_recorded_as_broken_link() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/", page_with_links(&["/products/999"])).await;
    mount_status(&mock_server, "/products/999", 404).await;

    let config = create_test_config(&mock_server.uri(), &dir);
    let (_, store) = crawl(&config).await;

    let snapshot = store.snapshot();
    assert_eq!(snapshot.broken_links, vec!["/products/999"]);
    assert!(!snapshot.products.contains_key("999"));
    // 404 is terminal: no retries.
    assert_eq!(request_count(&mock_server, "/products/999").await, 1);
}

#[tokio::test]
async fn test_client_error_is_not_retried_or_marked_broken() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/", page_with_links(&["/private"])).await;
    mount_status(&mock_server, "/private", 403).await;

    let config = create_test_config(&mock_server.uri(), &dir);
    let (_, store) = crawl(&config).await;

    assert_eq!(request_count(&mock_server, "/private").await, 1);
    assert!(store.snapshot().broken_links.is_empty());
}

#[tokio::test]
async fn test_transient_error_is_retried() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/", page_with_links(&["/products/7-flaky-bread/"])).await;

    // First request fails, the next one succeeds
    Mock::given(method("GET"))
        .and(path("/products/7-flaky-bread/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/products/7-flaky-bread/",
        "<html><body></body></html>".to_string(),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &dir);
    let (_, store) = crawl(&config).await;

    assert_eq!(request_count(&mock_server, "/products/7-flaky-bread/").await, 2);
    assert_eq!(store.product("7").unwrap().name, "flaky bread");
}

#[tokio::test]
async fn test_rate_limited_request_waits_for_retry_after() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/", page_with_links(&["/slow"])).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/slow", page_with_links(&[])).await;

    let config = create_test_config(&mock_server.uri(), &dir);
    let start = Instant::now();
    let (crawler, _) = crawl(&config).await;

    assert_eq!(request_count(&mock_server, "/slow").await, 2);
    assert_eq!(crawler.pages_fetched(), 2);
    // Retry-After of 1s minus 1ms for the first attempt
    assert!(start.elapsed() >= Duration::from_millis(990));
}

#[tokio::test]
async fn test_oversized_retry_after_ends_only_that_branch() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/",
        page_with_links(&["/limited", "/products/1-milk/"]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(
            ResponseTemplate::new(429).insert_header("Retry-After", "99999999999999999999"),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/1-milk/"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1e30"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/products/1-milk/",
        r#"<h1 itemprop="name">Milk</h1>"#.to_string(),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &dir);
    let report = run_crawl(config.clone()).await.expect("Crawl failed");

    // Unusable header: plain backoff until attempts run out
    assert_eq!(
        request_count(&mock_server, "/limited").await,
        config.retry.max_attempts as usize
    );
    assert_eq!(request_count(&mock_server, "/products/1-milk/").await, 2);
    assert_eq!(report.snapshot.products["1"].name, "Milk");

    let products = std::fs::read_to_string(&config.output.products_path).unwrap();
    assert_eq!(products, r#"{"1":{"name":"Milk"}}"#);
}

#[tokio::test]
async fn test_exhausted_branch_does_not_stop_siblings() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/",
        page_with_links(&["/down", "/products/42-eggs/"]),
    )
    .await;
    mount_status(&mock_server, "/down", 500).await;
    mount_page(
        &mock_server,
        "/products/42-eggs/",
        r#"<h1 itemprop="name">Eggs</h1>"#.to_string(),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &dir);
    let (_, store) = crawl(&config).await;

    assert_eq!(
        request_count(&mock_server, "/down").await,
        config.retry.max_attempts as usize
    );
    assert_eq!(store.product("42").unwrap().name, "Eggs");
    assert!(store.snapshot().broken_links.is_empty());
}

#[tokio::test]
async fn test_redirect_is_transient_and_not_followed() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/", page_with_links(&["/moved"])).await;
    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/target"))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/target", page_with_links(&[])).await;

    let config = create_test_config(&mock_server.uri(), &dir);
    crawl(&config).await;

    assert_eq!(
        request_count(&mock_server, "/moved").await,
        config.retry.max_attempts as usize
    );
    assert_eq!(request_count(&mock_server, "/target").await, 0);
}

#[tokio::test]
async fn test_depth_limit() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/", page_with_links(&["/d1"])).await;
    mount_page(&mock_server, "/d1", page_with_links(&["/d2"])).await;
    mount_page(&mock_server, "/d2", page_with_links(&["/d3"])).await;
    mount_page(&mock_server, "/d3", page_with_links(&["/d4"])).await;

    let config = create_test_config(&mock_server.uri(), &dir);
    let (crawler, store) = crawl(&config).await;

    assert_eq!(request_count(&mock_server, "/d2").await, 1);
    assert_eq!(request_count(&mock_server, "/d3").await, 0);
    assert_eq!(request_count(&mock_server, "/d4").await, 0);
    assert_eq!(crawler.pages_fetched(), 3);
    // Discovered at depth 3: claimed but never fetched
    assert!(store.visited().contains("/d3"));
}

#[tokio::test]
async fn test_concurrency_ceiling_is_respected() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let routes: Vec<String> = (0..40).map(|i| format!("/page{}", i)).collect();
    let links: Vec<&str> = routes.iter().map(String::as_str).collect();
    mount_page(&mock_server, "/", page_with_links(&links)).await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body></body></html>")
                .set_delay(Duration::from_millis(50)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), &dir);
    config.crawler.max_concurrent_fetches = 5;
    let (crawler, _) = crawl(&config).await;

    assert_eq!(crawler.pages_fetched(), 41);
    assert!(crawler.gate().peak_in_flight() <= 5);
    assert!(crawler.gate().peak_in_flight() > 1);
    assert_eq!(crawler.gate().in_flight(), 0);
}

#[tokio::test]
async fn test_run_crawl_writes_snapshot_files() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/",
        page_with_links(&["/products/1-milk/", "/products/2"]),
    )
    .await;
    mount_page(
        &mock_server,
        "/products/1-milk/",
        r#"<h1 itemprop="name">Milk</h1><span class="price" content="20"></span>"#.to_string(),
    )
    .await;
    mount_status(&mock_server, "/products/2", 404).await;

    let config = create_test_config(&mock_server.uri(), &dir);
    let report = run_crawl(config.clone()).await.expect("Crawl failed");

    assert_eq!(report.statistics.total_requests, 3);
    assert_eq!(report.statistics.products, 1);
    assert_eq!(report.statistics.broken_links, 1);

    let products = std::fs::read_to_string(&config.output.products_path).unwrap();
    assert_eq!(products, r#"{"1":{"name":"Milk","price":20}}"#);

    let broken = std::fs::read_to_string(&config.output.broken_links_path).unwrap();
    assert_eq!(broken, r#"["/products/2"]"#);
}
