//! Health Check and Public Page Tests

use axum::http::StatusCode;
use serde_json::Value;

use crate::common::TestApp;

#[tokio::test]
async fn test_health_check_returns_ok() {
    let app = TestApp::new().await;

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_liveness_probe() {
    let app = TestApp::new().await;

    let response = app.server.get("/health/live").await;

    response.assert_status_ok();
    response.assert_json(&serde_json::json!({ "status": "alive" }));
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let app = TestApp::new().await;

    let response = app.server.get("/health/ready").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["checks"]["database"]["status"], "unhealthy");
}

#[tokio::test]
async fn test_about_us_shows_clinic_contact() {
    let app = TestApp::new().await;

    let response = app.server.get("/about-us").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["name"], "Clínica Veterinaria Patitas");
    assert_eq!(body["phone"], "3001234567");
}

#[tokio::test]
async fn test_error_page_is_forbidden() {
    let app = TestApp::new().await;

    let response = app
        .server
        .get("/error/403")
        .add_header("accept-language", "en")
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["message"], "Access denied");
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let app = TestApp::new().await;

    let response = app.server.get("/health").await;

    assert_eq!(response.header("x-content-type-options"), "nosniff");
    assert_eq!(response.header("x-frame-options"), "DENY");
    assert!(response.maybe_header("strict-transport-security").is_none());
}
