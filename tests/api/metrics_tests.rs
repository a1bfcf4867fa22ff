//! Metrics Endpoint Tests

use crate::common::TestApp;

#[tokio::test]
async fn test_metrics_exposes_http_counters() {
    let app = TestApp::new().await;

    app.server.get("/health/live").await.assert_status_ok();
    let response = app.server.get("/metrics").await;

    response.assert_status_ok();
    let content_type = response.header("content-type");
    assert!(content_type.to_str().unwrap().starts_with("text/plain"));

    let text = response.text();
    assert!(text.contains("vet_clinic_http_requests_total"));
    assert!(text.contains("path=\"/health/live\""));
}
