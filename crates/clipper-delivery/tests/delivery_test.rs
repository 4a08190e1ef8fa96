//! HTTP delivery against a mock ingestion endpoint.

use clipper_core::DeliveryConfig;
use clipper_delivery::{DeliveryOutcome, DeliverySink, RecordSink};
use clipper_extract::{Page, Post, Record};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> DeliveryConfig {
    DeliveryConfig {
        endpoint: format!("{}/ingest", server.uri()),
        max_attempts: 3,
        base_backoff_ms: 10,
        max_backoff_ms: 50,
        timeout_secs: 5,
        dry_run: false,
    }
}

fn sample_post() -> Record {
    Record::Post(Post {
        post_url: "https://site/posts/1".into(),
        content: "hello".into(),
    })
}

#[tokio::test]
async fn test_delivers_payload_with_type_and_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ingest"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "type": "page",
            "data": { "pageUrl": "https://site/zeezoo", "name": "Zee Zoo" }
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let sink = DeliverySink::new(&config_for(&server)).unwrap();
    let record = Record::Page(Page {
        page_url: "https://site/zeezoo".into(),
        name: "Zee Zoo".into(),
    });

    assert_eq!(
        sink.deliver(&record).await,
        DeliveryOutcome::Delivered { attempts: 1 }
    );
}

#[tokio::test]
async fn test_retries_server_errors_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let sink = DeliverySink::new(&config_for(&server)).unwrap();

    assert_eq!(
        sink.deliver(&sample_post()).await,
        DeliveryOutcome::Delivered { attempts: 3 }
    );
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let sink = DeliverySink::new(&config_for(&server)).unwrap();

    assert_eq!(
        sink.deliver(&sample_post()).await,
        DeliveryOutcome::Delivered { attempts: 2 }
    );
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422))
        .expect(1)
        .mount(&server)
        .await;

    let sink = DeliverySink::new(&config_for(&server)).unwrap();

    assert_eq!(
        sink.deliver(&sample_post()).await,
        DeliveryOutcome::Rejected { status: 422 }
    );
}

#[tokio::test]
async fn test_gives_up_after_max_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let sink = DeliverySink::new(&config_for(&server)).unwrap();
    let outcome = sink.deliver(&sample_post()).await;

    assert_eq!(outcome, DeliveryOutcome::Failed { attempts: 3 });
    assert!(!outcome.is_delivered());
}

#[tokio::test]
async fn test_unreachable_endpoint_fails_without_panicking() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let config = DeliveryConfig {
        endpoint: format!("http://127.0.0.1:{port}/ingest"),
        max_attempts: 3,
        base_backoff_ms: 10,
        max_backoff_ms: 50,
        timeout_secs: 5,
        dry_run: false,
    };

    let sink = DeliverySink::new(&config).unwrap();

    assert_eq!(
        sink.deliver(&sample_post()).await,
        DeliveryOutcome::Failed { attempts: 3 }
    );
}

#[tokio::test]
async fn test_dry_run_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = DeliveryConfig {
        dry_run: true,
        ..config_for(&server)
    };
    let sink = DeliverySink::new(&config).unwrap();
    let outcome = sink.deliver(&sample_post()).await;

    assert_eq!(outcome, DeliveryOutcome::DryRun);
    assert!(outcome.is_delivered());
}
