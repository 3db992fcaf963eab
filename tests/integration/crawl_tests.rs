//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! fetching, robots.txt handling, rate limiting and shutdown end-to-end.

use fourbot::config::{Config, HttpConfig};
use fourbot::crawler::{build_http_client, crawl, fetch_url, Coordinator, Lifecycle};
use fourbot::FetchError;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with a fast rate limit
fn create_test_config(workers: u32, rate_limit_ms: u64) -> Config {
    let mut config = Config::default();
    config.crawler.workers = workers;
    config.crawler.rate_limit_ms = rate_limit_ms;
    config
}

async fn mount_robots(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Answers one connection with a raw response, then holds it open for `linger`
async fn serve_raw_once(response: &'static [u8], linger: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Failed to read address");

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await;
        let _ = socket.write_all(response).await;
        tokio::time::sleep(linger).await;
    });

    format!("http://{}/page", addr)
}

/// Mounts `/{prefix}{0..hops}` as a redirect chain ending in a 200 "end"
async fn mount_redirect_chain(server: &MockServer, prefix: &str, hops: usize) -> String {
    let base_url = server.uri();
    for hop in 0..hops {
        Mock::given(method("GET"))
            .and(path(format!("/{}{}", prefix, hop)))
            .respond_with(ResponseTemplate::new(302).insert_header(
                "location",
                format!("{}/{}{}", base_url, prefix, hop + 1).as_str(),
            ))
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(format!("/{}{}", prefix, hops)))
        .respond_with(ResponseTemplate::new(200).set_body_string("end"))
        .mount(server)
        .await;

    format!("{}/{}0", base_url, prefix)
}

#[tokio::test]
async fn test_fetch_success_returns_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "FourBot"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Hello, client"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = build_http_client(&HttpConfig::default()).expect("Failed to build client");
    let url = format!("{}/", mock_server.uri());
    let result = fetch_url(&client, &url).await;

    assert_eq!(result.url, url);
    assert_eq!(result.outcome, Ok("Hello, client".to_string()));
}

#[tokio::test]
async fn test_fetch_server_error_is_bad_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = build_http_client(&HttpConfig::default()).expect("Failed to build client");
    let result = fetch_url(&client, &format!("{}/broken", mock_server.uri())).await;

    assert_eq!(result.error(), Some(&FetchError::BadStatus(500)));
}

#[tokio::test]
async fn test_fetch_non_200_success_is_bad_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = build_http_client(&HttpConfig::default()).expect("Failed to build client");
    let result = fetch_url(&client, &format!("{}/empty", mock_server.uri())).await;

    assert_eq!(result.error(), Some(&FetchError::BadStatus(204)));
}

#[tokio::test]
async fn test_fetch_slow_server_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("too late")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let http = HttpConfig {
        timeout_secs: 1,
        ..HttpConfig::default()
    };
    let client = build_http_client(&http).expect("Failed to build client");

    let start = Instant::now();
    let result = fetch_url(&client, &format!("{}/slow", mock_server.uri())).await;

    assert!(
        matches!(result.error(), Some(FetchError::Timeout(_))),
        "unexpected outcome: {:?}",
        result.outcome
    );
    assert!(start.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_fetch_redirect_chain_is_capped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // /hop0 -> /hop1 -> ... -> /hop5
    for hop in 0..5 {
        Mock::given(method("GET"))
            .and(path(format!("/hop{}", hop)))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", format!("{}/hop{}", base_url, hop + 1).as_str()),
            )
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/hop5"))
        .respond_with(ResponseTemplate::new(200).set_body_string("end"))
        .mount(&mock_server)
        .await;

    let http = HttpConfig {
        max_redirects: 2,
        ..HttpConfig::default()
    };
    let client = build_http_client(&http).expect("Failed to build client");
    let result = fetch_url(&client, &format!("{}/hop0", base_url)).await;
    assert!(
        matches!(result.error(), Some(FetchError::TooManyRedirects(_))),
        "unexpected outcome: {:?}",
        result.outcome
    );

    // Within the cap the chain is followed to the end
    let client = build_http_client(&HttpConfig::default()).expect("Failed to build client");
    let result = fetch_url(&client, &format!("{}/hop0", base_url)).await;
    assert_eq!(result.body(), Some("end"));
}

#[tokio::test]
async fn test_fetch_redirect_cap_boundary() {
    let mock_server = MockServer::start().await;
    let http = HttpConfig {
        max_redirects: 3,
        ..HttpConfig::default()
    };
    let client = build_http_client(&http).expect("Failed to build client");

    let below_cap = mount_redirect_chain(&mock_server, "two", 2).await;
    let at_cap = mount_redirect_chain(&mock_server, "three", 3).await;

    let result = fetch_url(&client, &below_cap).await;
    assert_eq!(result.body(), Some("end"));

    let result = fetch_url(&client, &at_cap).await;
    assert!(
        matches!(result.error(), Some(FetchError::TooManyRedirects(_))),
        "unexpected outcome: {:?}",
        result.outcome
    );
}

#[tokio::test]
async fn test_fetch_truncated_body_is_body_read_error() {
    let url = serve_raw_once(
        b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nshort",
        Duration::ZERO,
    )
    .await;

    let client = build_http_client(&HttpConfig::default()).expect("Failed to build client");
    let result = fetch_url(&client, &url).await;

    assert!(
        matches!(result.error(), Some(FetchError::BodyRead(_))),
        "unexpected outcome: {:?}",
        result.outcome
    );
}

#[tokio::test]
async fn test_fetch_deadline_during_body_is_body_read_error() {
    let url = serve_raw_once(
        b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nshort",
        Duration::from_secs(5),
    )
    .await;

    let http = HttpConfig {
        timeout_secs: 1,
        ..HttpConfig::default()
    };
    let client = build_http_client(&http).expect("Failed to build client");

    let start = Instant::now();
    let result = fetch_url(&client, &url).await;

    assert!(
        matches!(result.error(), Some(FetchError::BodyRead(_))),
        "unexpected outcome: {:?}",
        result.outcome
    );
    assert!(start.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_robots_txt_respect() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // robots.txt is fetched once for the host, with the bot's user agent
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .and(header("user-agent", "FourBot"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: FourBot\nDisallow: /private"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/public"))
        .respond_with(ResponseTemplate::new(200).set_body_string("public content"))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Should never be called
    Mock::given(method("GET"))
        .and(path("/private"))
        .respond_with(ResponseTemplate::new(200).set_body_string("secret"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let coordinator =
        Coordinator::new(create_test_config(2, 5)).expect("Failed to create coordinator");
    let urls = vec![format!("{}/private", base_url), format!("{}/public", base_url)];

    let mut out = Vec::new();
    let outcome = crawl(coordinator, urls, &mut out).await.expect("Crawl failed");

    assert_eq!(outcome.dispatch.submitted, 2);
    assert_eq!(outcome.statistics.fetched, 1);
    assert_eq!(outcome.statistics.by_kind.get("robots-disallowed"), Some(&1));

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains(&format!(
        "Error fetching {}/private: disallowed by robots.txt",
        base_url
    )));
    assert!(text.contains(&format!(
        "Fetched URL: {}/public\nContent: public content",
        base_url
    )));

    // Wiremock verifies expectations when mock_server drops
}

#[tokio::test]
async fn test_missing_robots_txt_allows_all() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, 404, "").await;

    Mock::given(method("GET"))
        .and(path("/private"))
        .respond_with(ResponseTemplate::new(200).set_body_string("reachable"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let coordinator =
        Coordinator::new(create_test_config(1, 5)).expect("Failed to create coordinator");
    let robots = coordinator.robots();

    let mut out = Vec::new();
    let outcome = crawl(coordinator, vec![format!("{}/private", base_url)], &mut out)
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.statistics.fetched, 1);
    assert_eq!(robots.len().await, 1);
    assert!(robots.get(&base_url).await.expect("host resolved").is_none());
}

#[tokio::test]
async fn test_one_result_per_submitted_job() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, 200, "User-agent: *\nDisallow: /admin").await;

    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fine"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/error"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let mut urls = Vec::new();
    for _ in 0..4 {
        for page in ["/ok", "/missing", "/error", "/admin"] {
            urls.push(format!("{}{}", base_url, page));
        }
    }
    urls.push("definitely not a url".to_string());

    let coordinator =
        Coordinator::new(create_test_config(5, 1)).expect("Failed to create coordinator");
    let shutdown = coordinator.shutdown();

    let mut handle = coordinator.spawn(urls);
    let mut seen = Vec::new();
    while let Some(result) = handle.results.recv().await {
        seen.push(result);
    }
    let report = handle.task.await.unwrap().expect("Crawl failed");

    assert_eq!(report.submitted, 16);
    assert_eq!(report.skipped, 1);
    assert_eq!(seen.len(), report.submitted);
    assert_eq!(shutdown.state(), Lifecycle::Closed);

    let fetched = seen.iter().filter(|r| r.body() == Some("fine")).count();
    assert_eq!(fetched, 4);
    for expected in [
        FetchError::BadStatus(404),
        FetchError::BadStatus(500),
        FetchError::RobotsDisallowed,
    ] {
        let matching = seen.iter().filter(|r| r.error() == Some(&expected)).count();
        assert_eq!(matching, 4, "wrong count for {:?}", expected);
    }
}

#[tokio::test]
async fn test_rate_limit_is_global_across_workers() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, 404, "").await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x"))
        .expect(10)
        .mount(&mock_server)
        .await;

    let urls = vec![format!("{}/page", base_url); 10];
    let coordinator =
        Coordinator::new(create_test_config(5, 50)).expect("Failed to create coordinator");
    let limiter = coordinator.rate_limiter();

    let start = Instant::now();
    let mut out = Vec::new();
    let outcome = crawl(coordinator, urls, &mut out).await.expect("Crawl failed");

    assert_eq!(outcome.statistics.fetched, 10);
    assert_eq!(limiter.grants(), 10);
    // 10 fetch starts need 9 full intervals no matter how many workers run
    assert!(
        start.elapsed() >= Duration::from_millis(450),
        "finished too fast: {:?}",
        start.elapsed()
    );
}

#[tokio::test]
async fn test_stop_signal_drains_in_flight_jobs() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, 404, "").await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("done")
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(2, 1);
    config.crawler.queue_capacity = 1;
    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let shutdown = coordinator.shutdown();

    let urls: Vec<String> = (0..20).map(|i| format!("{}/slow?n={}", base_url, i)).collect();
    let mut handle = coordinator.spawn(urls);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(shutdown.request_stop());
    assert_eq!(shutdown.state(), Lifecycle::Draining);

    let mut results = Vec::new();
    while let Some(result) = handle.results.recv().await {
        results.push(result);
    }
    let report = handle.task.await.unwrap().expect("Crawl failed");

    // Everything submitted before the stop finished; nothing after it started
    assert!(report.submitted >= 1 && report.submitted < 20);
    assert_eq!(results.len(), report.submitted);
    assert_eq!(report.submitted + report.dropped, 20);
    assert!(results.iter().all(|r| r.body() == Some("done")));
    assert_eq!(shutdown.state(), Lifecycle::Closed);
    assert_eq!(shutdown.in_flight().in_flight(), 0);
}
