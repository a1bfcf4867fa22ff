//! API Description Tests

use serde_json::Value;

use crate::common::TestApp;

#[tokio::test]
async fn test_openapi_document_is_public() {
    let app = TestApp::new().await;

    let response = app.server.get("/api-docs/openapi.json").await;

    response.assert_status_ok();
    let doc: Value = response.json();
    assert!(doc["openapi"].as_str().unwrap().starts_with("3."));
    assert_eq!(doc["info"]["title"], "vet-clinic");
    assert!(doc["paths"]["/citas/guardar"]["post"].is_object());
    assert!(doc["paths"]["/admin/usuarios/{id}"]["put"].is_object());
}
