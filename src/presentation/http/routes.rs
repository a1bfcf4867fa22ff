//! Route Configuration
//!
//! Configures all HTTP routes for the clinic.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use super::{handlers, openapi};
use crate::infrastructure::metrics;
use crate::presentation::middleware::{
    auth_middleware, create_security_headers_layer, logging::track_metrics, rate_limit_auth,
    require_admin,
};
use crate::startup::AppState;

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    let security_headers = create_security_headers_layer(&state.settings.server);

    Router::new()
        .merge(public_routes())
        .merge(auth_routes(state.clone()))
        .merge(session_routes())
        .merge(account_routes(state.clone()))
        .nest("/mascotas", pet_routes(state.clone()))
        .nest("/citas", appointment_routes(state.clone()))
        .nest("/admin/usuarios", admin_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .route_layer(middleware::from_fn(track_metrics))
        // outermost, so error responses carry the headers too
        .layer(security_headers)
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// Pages anyone can see
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::public::home))
        .route("/about-us", get(handlers::public::about_us))
        .route("/error/403", get(handlers::public::forbidden))
        .route("/changeLanguage", get(handlers::language::change_language))
}

/// Credential endpoints (stricter rate limiting)
fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route_layer(middleware::from_fn_with_state(state, rate_limit_auth))
}

/// Token rotation and logout; authorized by the refresh token itself
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/refresh", post(handlers::auth::refresh_token))
        .route("/logout", post(handlers::auth::logout))
}

/// Current user (protected)
fn account_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::auth::me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Pet routes (protected, owner-scoped)
fn pet_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::pet::list_pets).post(handlers::pet::create_pet),
        )
        .route(
            "/{id}",
            get(handlers::pet::get_pet)
                .put(handlers::pet::update_pet)
                .delete(handlers::pet::delete_pet),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Appointment routes (protected, owner-scoped)
fn appointment_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/agendar", get(handlers::appointment::booking_view))
        .route("/horarios/{date}", get(handlers::appointment::slot_board))
        .route("/guardar", post(handlers::appointment::book))
        .route("/mis-citas", get(handlers::appointment::my_appointments))
        .route("/cancelar/{id}", post(handlers::appointment::cancel))
        .route("/editar/{id}", get(handlers::appointment::edit_view))
        .route("/actualizar/{id}", post(handlers::appointment::reschedule))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// User administration (ADMIN only)
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::admin::list_users).post(handlers::admin::create_user),
        )
        .route("/roles", get(handlers::admin::list_roles))
        .route(
            "/{id}",
            get(handlers::admin::get_user)
                .put(handlers::admin::update_user)
                .delete(handlers::admin::delete_user),
        )
        // layers run bottom-up: authenticate, then check the role
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
