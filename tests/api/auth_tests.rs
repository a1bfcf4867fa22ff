//! Authentication API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{test_settings, unique_client_ip, TestApp, AUTH_LIMIT};

fn field_messages(body: &Value) -> Vec<(String, String)> {
    body["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .map(|e| {
                    (
                        e["field"].as_str().unwrap_or_default().to_string(),
                        e["message"].as_str().unwrap_or_default().to_string(),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_register_rejects_invalid_fields_in_english() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/register")
        .add_header("accept-language", "en-US,en;q=0.9")
        .json(&json!({
            "first_name": "Al",
            "last_name": "Gómez",
            "email": "not-an-email",
            "phone": "2001234567",
            "password": "weak"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "The request contains invalid data");
    assert_eq!(
        field_messages(&body),
        vec![
            ("email".to_string(), "Email address is not valid".to_string()),
            ("first_name".to_string(), "Name must be 3 to 50 letters".to_string()),
            (
                "password".to_string(),
                "Password needs at least 8 characters, one uppercase letter, one lowercase letter and one digit"
                    .to_string()
            ),
            (
                "phone".to_string(),
                "Phone must start with 3 and have 10 digits".to_string()
            ),
        ]
    );
}

#[tokio::test]
async fn test_register_messages_follow_language_cookie() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/register")
        .add_header("accept-language", "en")
        .add_header("cookie", "lang=es")
        .json(&json!({
            "first_name": "Camila",
            "last_name": "Rodríguez",
            "email": "camila@example.com",
            "phone": "123",
            "password": "Secreto123"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        field_messages(&body),
        vec![(
            "phone".to_string(),
            "El teléfono debe empezar por 3 y tener 10 dígitos".to_string()
        )]
    );
}

#[tokio::test]
async fn test_login_with_malformed_body_is_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/login")
        .content_type("application/json")
        .bytes("{\"email\": ".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "La solicitud no tiene un formato válido");
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/login")
        .json(&json!({ "email": "", "password": "" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let fields: Vec<String> = field_messages(&response.json())
        .into_iter()
        .map(|(field, _)| field)
        .collect();
    assert_eq!(fields, vec!["email", "password"]);
}

#[tokio::test]
async fn test_auth_endpoints_are_rate_limited() {
    let app = TestApp::new().await;
    let client = unique_client_ip();

    for _ in 0..AUTH_LIMIT {
        let response = app
            .server
            .post("/login")
            .add_header("x-forwarded-for", client.clone())
            .json(&json!({ "email": "", "password": "" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    let response = app
        .server
        .post("/register")
        .add_header("x-forwarded-for", client.clone())
        .add_header("accept-language", "en")
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert!(response.maybe_header("retry-after").is_some());
    assert_eq!(response.header("x-ratelimit-remaining"), "0");
    let body: Value = response.json();
    assert_eq!(body["message"], "Too many requests, try again later");

    // other clients keep their own window
    app.server
        .post("/login")
        .add_header("x-forwarded-for", unique_client_ip())
        .json(&json!({ "email": "", "password": "" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_forwarded_header_is_ignored_without_trusted_proxy() {
    let mut settings = test_settings();
    settings.rate_limit.trust_proxy = false;
    let app = TestApp::with_settings(settings).await;

    for _ in 0..AUTH_LIMIT {
        app.server
            .post("/login")
            .add_header("x-forwarded-for", unique_client_ip())
            .json(&json!({ "email": "", "password": "" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    // a fresh forwarded address does not open a new window
    app.server
        .post("/login")
        .add_header("x-forwarded-for", unique_client_ip())
        .json(&json!({ "email": "", "password": "" }))
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::new().await;

    let response = app
        .server
        .get("/me")
        .add_header("accept-language", "en")
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Authentication required");
}

#[tokio::test]
async fn test_me_rejects_garbage_token() {
    let app = TestApp::new().await;

    app.server
        .get("/me")
        .authorization_bearer("not.a.jwt")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
