use gridfill::enrich::{
    BatchRequest, Coordinator, EnrichOutcome, EnrichTransport, HttpTransport,
};
use gridfill::error::EnrichError;
use gridfill::grid::Grid;
use gridfill::notify::{self, Notification};
use httpmock::prelude::*;
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Duration;

fn transport(server: &MockServer) -> HttpTransport {
    HttpTransport::new(&server.base_url(), Duration::from_secs(5))
}

fn request() -> BatchRequest {
    BatchRequest {
        column_name: "CEO".into(),
        rows: vec!["Acme".into(), String::new()],
        context_values: BTreeMap::from([("Industry".to_string(), "Retail".to_string())]),
    }
}

#[test]
fn batch_call_posts_json_and_decodes_reply() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/enrich/batch")
            .json_body(json!({
                "column_name": "CEO",
                "rows": ["Acme", ""],
                "context_values": {"Industry": "Retail"}
            }));
        then.status(200).json_body(json!({
            "enriched_values": ["Jane Doe", ""],
            "sources": [[{"title": "Acme leadership", "url": "https://acme.example/about"}], []],
            "status": "success"
        }));
    });

    let response = transport(&server).enrich_batch(&request()).unwrap();

    mock.assert();
    assert_eq!(response.enriched_values, vec!["Jane Doe", ""]);
    assert_eq!(response.sources[0][0].title, "Acme leadership");
    assert!(response.validate(2).is_ok());
}

#[test]
fn server_error_maps_to_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/enrich/batch");
        then.status(500).body("boom");
    });

    let err = transport(&server).enrich_batch(&request()).unwrap_err();
    assert_eq!(err, EnrichError::Status { code: 500 });
}

#[test]
fn non_json_body_is_malformed() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/enrich/batch");
        then.status(200).body("<html>not json</html>");
    });

    let err = transport(&server).enrich_batch(&request()).unwrap_err();
    assert!(matches!(err, EnrichError::MalformedResponse(_)));
}

#[test]
fn unreachable_service_is_a_transport_error() {
    let transport = HttpTransport::new("http://127.0.0.1:9", Duration::from_millis(500));
    let err = transport.enrich_batch(&request()).unwrap_err();
    assert!(matches!(err, EnrichError::Transport(_)), "{err:?}");
}

#[test]
fn health_endpoint_reports_healthy() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/health");
        then.status(200).json_body(json!({"status": "healthy"}));
    });

    let health = transport(&server).health().unwrap();
    mock.assert();
    assert!(health.is_healthy());
}

#[test]
fn coordinator_over_http_reports_service_error_as_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/enrich/batch");
        then.status(200).json_body(json!({
            "enriched_values": ["Error during enrichment"],
            "sources": [[]],
            "status": "error",
            "error": "upstream timeout"
        }));
    });

    let grid = Grid::from_values(
        vec!["Company".into(), "CEO".into()],
        vec![vec!["Acme".into(), "Jane".into()]],
    )
    .unwrap();
    let (sink, receiver) = notify::channel();
    let coordinator = Coordinator::new(transport(&server), sink);

    let (done, outcome) = coordinator.enrich_snapshot(&grid, 1, 0);

    assert_eq!(
        outcome,
        EnrichOutcome::Failed(EnrichError::ServiceReported("upstream timeout".into()))
    );
    assert_eq!(done.cell(0, 1).unwrap().value, "Jane");
    assert_eq!(
        receiver.try_iter().collect::<Vec<_>>(),
        vec![Notification::error("Enrichment failed")]
    );
}
