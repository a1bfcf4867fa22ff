//! Language Switch Tests

use axum::http::StatusCode;
use serde_json::Value;

use crate::common::TestApp;

#[tokio::test]
async fn test_change_language_sets_cookie_and_returns_to_referer() {
    let app = TestApp::new().await;

    let response = app
        .server
        .get("/changeLanguage")
        .add_query_param("lang", "en")
        .add_header("referer", "http://localhost:8080/citas/mis-citas")
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/citas/mis-citas");
    assert_eq!(response.cookie("lang").value(), "en");
}

#[tokio::test]
async fn test_change_language_without_referer_goes_home() {
    let app = TestApp::new().await;

    let response = app
        .server
        .get("/changeLanguage")
        .add_query_param("lang", "es")
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/");
    assert_eq!(response.cookie("lang").value(), "es");
}

#[tokio::test]
async fn test_unsupported_language_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .server
        .get("/changeLanguage")
        .add_query_param("lang", "fr")
        .add_header("accept-language", "en")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Unsupported language");
    assert!(response.maybe_cookie("lang").is_none());
}

#[tokio::test]
async fn test_missing_lang_parameter_is_malformed() {
    let app = TestApp::new().await;

    app.server
        .get("/changeLanguage")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
