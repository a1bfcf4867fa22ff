//! Access Control Tests
//!
//! Protected pet, appointment and admin routes reject callers before any
//! storage access.

use axum::http::StatusCode;
use serde_json::{json, Value};
use test_case::test_case;

use crate::common::TestApp;

#[test_case("/mascotas" ; "pet list")]
#[test_case("/mascotas/1" ; "pet detail")]
#[test_case("/citas/agendar" ; "booking view")]
#[test_case("/citas/mis-citas" ; "my appointments")]
#[test_case("/citas/horarios/2026-05-04" ; "slot board")]
#[test_case("/citas/editar/1" ; "edit view")]
#[test_case("/admin/usuarios" ; "admin user list")]
#[tokio::test]
async fn test_protected_get_without_token_is_unauthorized(path: &str) {
    let app = TestApp::new().await;

    app.server
        .get(path)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_booking_without_token_is_unauthorized() {
    let app = TestApp::new().await;

    app.server
        .post("/citas/guardar")
        .json(&json!({
            "date": "2026-05-04",
            "time": "09:30",
            "pet_id": 1,
            "service_id": 1
        }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[test_case("/admin/usuarios" ; "list")]
#[test_case("/admin/usuarios/roles" ; "roles")]
#[test_case("/admin/usuarios/7" ; "detail")]
#[tokio::test]
async fn test_admin_area_forbids_plain_users(path: &str) {
    let app = TestApp::new().await;
    let token = app.user_token(42);

    let response = app
        .server
        .get(path)
        .authorization_bearer(token)
        .add_header("accept-language", "en")
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["message"], "Access denied");
}

#[tokio::test]
async fn test_admin_delete_forbids_plain_users() {
    let app = TestApp::new().await;
    let token = app.user_token(42);

    app.server
        .delete("/admin/usuarios/42")
        .authorization_bearer(token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_create_validates_before_storage() {
    let app = TestApp::new().await;
    let token = app.admin_token(1);

    let response = app
        .server
        .post("/admin/usuarios")
        .authorization_bearer(token)
        .add_header("accept-language", "en")
        .json(&json!({
            "first_name": "Camila",
            "last_name": "Rodríguez",
            "email": "camila@example.com",
            "phone": "3104567890",
            "password": "Secreto123",
            "role_ids": []
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["errors"][0]["field"], "role_ids");
    assert_eq!(body["errors"][0]["message"], "Select at least one role");
}

#[tokio::test]
async fn test_slot_board_rejects_bad_date() {
    let app = TestApp::new().await;
    let token = app.user_token(42);

    let response = app
        .server
        .get("/citas/horarios/04-05-2026")
        .authorization_bearer(token)
        .add_header("accept-language", "en")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "The request is malformed");
}

#[tokio::test]
async fn test_pet_routes_reject_non_numeric_id() {
    let app = TestApp::new().await;
    let token = app.user_token(42);

    app.server
        .get("/mascotas/firulais")
        .authorization_bearer(token)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_pet_create_validates_before_storage() {
    let app = TestApp::new().await;
    let token = app.user_token(42);

    let response = app
        .server
        .post("/mascotas")
        .authorization_bearer(token)
        .json(&json!({
            "name": "Firulais",
            "species": "Perro",
            "breed": "Labrador",
            "birth_date": "2020-03-15",
            "sex": "Macho"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["errors"][0]["field"], "birth_date");
}

#[tokio::test]
async fn test_booking_with_unparseable_date_is_bad_request() {
    let app = TestApp::new().await;
    let token = app.user_token(42);

    app.server
        .post("/citas/guardar")
        .authorization_bearer(token)
        .json(&json!({
            "date": "mañana",
            "time": "09:30",
            "pet_id": 1,
            "service_id": 1
        }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
