//! OpenAPI Document
//!
//! Describes the JSON API; served at `/api-docs/openapi.json`.

use axum::Json;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::handlers;
use crate::shared::error::{ErrorResponse, FieldError};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::public::home,
        handlers::public::about_us,
        handlers::public::forbidden,
        handlers::language::change_language,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh_token,
        handlers::auth::logout,
        handlers::auth::me,
        handlers::pet::list_pets,
        handlers::pet::create_pet,
        handlers::pet::get_pet,
        handlers::pet::update_pet,
        handlers::pet::delete_pet,
        handlers::appointment::booking_view,
        handlers::appointment::slot_board,
        handlers::appointment::book,
        handlers::appointment::my_appointments,
        handlers::appointment::cancel,
        handlers::appointment::edit_view,
        handlers::appointment::reschedule,
        handlers::admin::list_users,
        handlers::admin::list_roles,
        handlers::admin::create_user,
        handlers::admin::get_user,
        handlers::admin::update_user,
        handlers::admin::delete_user,
    ),
    components(schemas(ErrorResponse, FieldError)),
    modifiers(&BearerAuth),
    tags(
        (name = "public", description = "Clinic pages and language switch"),
        (name = "auth", description = "Registration, login and token rotation"),
        (name = "pets", description = "Pets of the signed-in owner"),
        (name = "appointments", description = "Booking on the 30 minute slot grid"),
        (name = "admin", description = "User administration, ADMIN role only"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected operations.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn document() -> Value {
        serde_json::to_value(ApiDoc::openapi()).unwrap()
    }

    #[test]
    fn test_documents_every_area() {
        let doc = document();
        let paths = doc["paths"].as_object().unwrap();

        for path in [
            "/",
            "/changeLanguage",
            "/login",
            "/mascotas/{id}",
            "/citas/horarios/{date}",
            "/citas/cancelar/{id}",
            "/admin/usuarios/roles",
        ] {
            assert!(paths.contains_key(path), "{path} is not documented");
        }
        assert!(doc["paths"]["/mascotas/{id}"]["delete"].is_object());
        assert!(doc["paths"]["/citas/guardar"]["post"]["requestBody"].is_object());
    }

    #[test]
    fn test_protected_operations_use_bearer_scheme() {
        let doc = document();

        assert_eq!(
            doc["components"]["securitySchemes"]["bearer_auth"]["scheme"],
            "bearer"
        );
        assert!(doc["paths"]["/citas/mis-citas"]["get"]["security"].is_array());
        assert!(doc["paths"]["/login"]["post"]["security"].is_null());
    }

    #[test]
    fn test_error_body_schema_is_registered() {
        let doc = document();
        let schemas = doc["components"]["schemas"].as_object().unwrap();

        assert!(schemas.contains_key("ErrorResponse"));
        assert!(schemas.contains_key("FieldError"));
        assert!(schemas.contains_key("PetRequest"));
        assert!(schemas.contains_key("SlotBoardResponse"));
    }
}
