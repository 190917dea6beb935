//! Neighbor-service tests against a wiremock server.

#![allow(clippy::unwrap_used, clippy::panic)]

use levelcrawl::{HttpNeighborSource, Settings};
use levelcrawl_core::{CrawlConfig, Crawler, FailureCause, FetchError, NeighborSource, Vertex};
use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// HELPERS
// =============================================================================

fn settings_for(server: &MockServer) -> Settings {
    Settings {
        service_url: format!("{}/neighbors/", server.uri()),
        retry_backoff_ms: 1,
        ..Settings::default()
    }
}

fn source_for(server: &MockServer) -> HttpNeighborSource {
    HttpNeighborSource::new(&settings_for(server)).unwrap()
}

async fn mount_neighbors(server: &MockServer, vertex_path: &str, neighbors: &[&str]) {
    Mock::given(method("GET"))
        .and(path(vertex_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "neighbors": neighbors })))
        .mount(server)
        .await;
}

fn names(frontier: &[Vertex]) -> Vec<&str> {
    let mut names: Vec<&str> = frontier.iter().map(Vertex::as_str).collect();
    names.sort_unstable();
    names
}

// =============================================================================
// SINGLE LOOKUPS
// =============================================================================

#[tokio::test]
async fn fetch_returns_neighbors_in_service_order() {
    let server = MockServer::start().await;
    mount_neighbors(&server, "/neighbors/A", &["C", "B"]).await;

    let neighbors = source_for(&server)
        .fetch_neighbors(&Vertex::new("A"))
        .await
        .unwrap();

    assert_eq!(neighbors, vec![Vertex::new("C"), Vertex::new("B")]);
}

#[tokio::test]
async fn vertex_name_is_percent_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/neighbors/Tom%20Hanks"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "neighbors": ["Big"] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let neighbors = source_for(&server)
        .fetch_neighbors(&Vertex::new("Tom Hanks"))
        .await
        .unwrap();

    assert_eq!(neighbors, vec![Vertex::new("Big")]);
}

#[tokio::test]
async fn user_agent_header_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "levelcrawl-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "neighbors": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let settings = Settings {
        user_agent: "levelcrawl-test".to_string(),
        ..settings_for(&server)
    };
    let source = HttpNeighborSource::new(&settings).unwrap();

    assert!(source.fetch_neighbors(&Vertex::new("A")).await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_neighbors_field_means_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/neighbors/A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "A" })))
        .mount(&server)
        .await;

    let neighbors = source_for(&server)
        .fetch_neighbors(&Vertex::new("A"))
        .await
        .unwrap();

    assert!(neighbors.is_empty());
}

#[tokio::test]
async fn malformed_body_is_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/neighbors/A"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = source_for(&server)
        .fetch_neighbors(&Vertex::new("A"))
        .await
        .unwrap_err();

    assert!(err.is_decode(), "expected decode failure, got {:?}", err);
}

#[tokio::test]
async fn error_status_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/neighbors/A"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = source_for(&server)
        .fetch_neighbors(&Vertex::new("A"))
        .await
        .unwrap_err();

    assert!(err.is_transport());
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn slow_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "neighbors": [] }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let settings = Settings {
        timeout_ms: 50,
        ..settings_for(&server)
    };
    let source = HttpNeighborSource::new(&settings).unwrap();

    let err = source.fetch_neighbors(&Vertex::new("A")).await.unwrap_err();
    assert!(err.is_transport());
}

// =============================================================================
// RETRIES AND RATE LIMIT
// =============================================================================

#[tokio::test]
async fn transport_failure_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/neighbors/A"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_neighbors(&server, "/neighbors/A", &["B"]).await;

    let settings = Settings {
        retries: 2,
        ..settings_for(&server)
    };
    let source = HttpNeighborSource::new(&settings).unwrap();

    let neighbors = source.fetch_neighbors(&Vertex::new("A")).await.unwrap();
    assert_eq!(neighbors, vec![Vertex::new("B")]);
}

#[tokio::test]
async fn retries_are_bounded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let settings = Settings {
        retries: 2,
        ..settings_for(&server)
    };
    let source = HttpNeighborSource::new(&settings).unwrap();

    assert!(source.fetch_neighbors(&Vertex::new("A")).await.is_err());
}

#[tokio::test]
async fn decode_failure_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let settings = Settings {
        retries: 3,
        ..settings_for(&server)
    };
    let source = HttpNeighborSource::new(&settings).unwrap();

    let err = source.fetch_neighbors(&Vertex::new("A")).await.unwrap_err();
    assert!(err.is_decode());
}

#[tokio::test]
async fn rate_limit_spaces_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "neighbors": [] })))
        .mount(&server)
        .await;

    let settings = Settings {
        rate_limit: 2,
        ..settings_for(&server)
    };
    let source = HttpNeighborSource::new(&settings).unwrap();

    let begin = Instant::now();
    for name in ["A", "B", "C"] {
        source.fetch_neighbors(&Vertex::new(name)).await.unwrap();
    }

    // Burst of two, the third waits for a replenished cell.
    assert!(begin.elapsed() >= Duration::from_millis(400));
}

// =============================================================================
// END-TO-END CRAWL
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn crawl_over_http() {
    let server = MockServer::start().await;
    mount_neighbors(&server, "/neighbors/A", &["B", "C"]).await;
    mount_neighbors(&server, "/neighbors/B", &["A", "D"]).await;
    mount_neighbors(&server, "/neighbors/C", &["D"]).await;
    mount_neighbors(&server, "/neighbors/D", &[]).await;

    let crawler = Crawler::new(source_for(&server));
    let report = crawler.crawl(Vertex::new("A"), 2).await.unwrap();

    assert_eq!(report.levels.len(), 3);
    assert_eq!(names(report.frontier(0)), vec!["A"]);
    assert_eq!(names(report.frontier(1)), vec!["B", "C"]);
    assert_eq!(names(report.frontier(2)), vec!["D"]);
    assert!(report.is_complete());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failed_lookup_does_not_stop_crawl() {
    let server = MockServer::start().await;
    mount_neighbors(&server, "/neighbors/A", &["B", "C"]).await;
    Mock::given(method("GET"))
        .and(path("/neighbors/B"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_neighbors(&server, "/neighbors/C", &["D"]).await;

    let config = CrawlConfig {
        max_concurrency: 2,
        ..CrawlConfig::default()
    };
    let crawler = Crawler::with_config(source_for(&server), config);
    let report = crawler.crawl(Vertex::new("A"), 2).await.unwrap();

    assert_eq!(names(report.frontier(1)), vec!["B", "C"]);
    assert_eq!(names(report.frontier(2)), vec!["D"]);
    assert_eq!(report.failures.len(), 1);

    let failure = &report.failures[0];
    assert_eq!(failure.vertex, Vertex::new("B"));
    assert_eq!(failure.depth, 1);
    assert!(matches!(
        failure.cause,
        FailureCause::Fetch(FetchError::Transport(_))
    ));
}
