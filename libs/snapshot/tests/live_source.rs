//! Live source tests against a mock orchestration service.

use std::time::Duration;

use allocheck_model::ClientStatus;
use allocheck_snapshot::{LiveSource, LiveSourceConfig, SnapshotSource, SourceError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source_for(server: &MockServer, token: Option<&str>) -> LiveSource {
    LiveSource::new(&LiveSourceConfig {
        address: server.uri(),
        token: token.map(str::to_string),
        region: None,
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn test_list_allocations_requests_all_namespaces() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/allocations"))
        .and(query_param("namespace", "*"))
        .and(header("X-Nomad-Token", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "ID": "a1", "Namespace": "default", "NodeID": "n1", "ClientStatus": "running" },
            { "ID": "a2", "Namespace": "prod", "NodeID": "n2", "ClientStatus": "complete" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let source = source_for(&server, Some("secret"));
    let allocs = source.list_allocations().await.unwrap();

    assert_eq!(allocs.len(), 2);
    assert_eq!(allocs[0].id, "a1");
    assert_eq!(allocs[1].client_status, ClientStatus::Complete);
}

#[tokio::test]
async fn test_list_namespaces_is_always_available() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/namespaces"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "Name": "default", "Description": "Default shared namespace" }
        ])))
        .mount(&server)
        .await;

    let source = source_for(&server, None);
    let namespaces = source.list_namespaces().await.unwrap().unwrap();

    assert_eq!(namespaces.len(), 1);
    assert_eq!(namespaces[0].name, "default");
}

#[tokio::test]
async fn test_null_listing_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/nodes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let source = source_for(&server, None);
    assert!(source.list_nodes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_error_status_is_list_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/nodes"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Permission denied"))
        .mount(&server)
        .await;

    let source = source_for(&server, None);
    let err = source.list_nodes().await.unwrap_err();

    assert!(matches!(err, SourceError::ListFailure { resource: "nodes", .. }));
    let cause = std::error::Error::source(&err).unwrap().to_string();
    assert!(cause.contains("403"));
    assert!(cause.contains("Permission denied"));
}

#[tokio::test]
async fn test_unreachable_service_is_unavailable() {
    let server = MockServer::start().await;
    let address = server.uri();
    drop(server);

    let source = LiveSource::new(&LiveSourceConfig {
        address,
        timeout: Duration::from_secs(2),
        ..Default::default()
    })
    .unwrap();
    let err = source.list_allocations().await.unwrap_err();

    assert!(matches!(
        err,
        SourceError::Unavailable {
            resource: "allocations",
            ..
        }
    ));
}

#[tokio::test]
async fn test_get_allocation_and_node() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/allocation/a1"))
        .and(query_param("namespace", "*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ID": "a1",
            "NodeID": "n1",
            "ClientStatus": "pending",
            "Job": { "ID": "web", "Type": "service" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/node/n1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ID": "n1",
            "Status": "down",
            "HTTPAddr": "10.0.0.1:4646"
        })))
        .mount(&server)
        .await;

    let source = source_for(&server, None);
    let alloc = source.get_allocation("a1").await.unwrap();
    assert_eq!(alloc.node_id(), "n1");
    assert_eq!(alloc.job.as_ref().unwrap()["Type"], "service");

    let node = source.get_node("n1").await.unwrap();
    assert!(node.summary.status.is_down());
    assert_eq!(node.http_addr, "10.0.0.1:4646");
}

#[tokio::test]
async fn test_get_unknown_id_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/allocation/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_string("alloc not found"))
        .mount(&server)
        .await;

    let source = source_for(&server, None);
    let err = source.get_allocation("ghost").await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "alloc id ghost not found");
}

#[tokio::test]
async fn test_get_allocation_encodes_id_as_one_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/allocation/a1%2Fstop"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let source = source_for(&server, None);
    let err = source.get_allocation("a1/stop").await.unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_get_server_error_is_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/node/n1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let source = source_for(&server, None);
    let err = source.get_node("n1").await.unwrap_err();

    assert!(matches!(err, SourceError::FetchFailed { kind: "node", .. }));
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn test_region_is_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/nodes"))
        .and(query_param("region", "eu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "ID": "n1", "Status": "ready" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let source = LiveSource::new(&LiveSourceConfig {
        address: server.uri(),
        region: Some("eu".to_string()),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(source.list_nodes().await.unwrap().len(), 1);
}
