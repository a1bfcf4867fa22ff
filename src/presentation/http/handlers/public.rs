//! Public Pages

use axum::{extract::State, Json};

use super::appointment_service;
use crate::application::dto::response::{ClinicInfoResponse, HomeResponse};
use crate::application::services::AppointmentService;
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::i18n::Locale;
use crate::startup::AppState;

/// Home page: clinic data and the services open for booking
#[utoipa::path(
    get,
    path = "/",
    tag = "public",
    responses(
        (status = 200, description = "Clinic data and bookable services", body = HomeResponse)
    )
)]
pub async fn home(
    State(state): State<AppState>,
    locale: Locale,
) -> Result<Json<HomeResponse>, AppError> {
    let services = appointment_service(&state)
        .active_services()
        .await
        .map_err(|e| e.localized(locale))?;

    Ok(Json(HomeResponse {
        clinic: ClinicInfoResponse::from(&state.settings.clinic),
        services,
    }))
}

#[utoipa::path(
    get,
    path = "/about-us",
    tag = "public",
    responses(
        (status = 200, description = "Clinic contact data", body = ClinicInfoResponse)
    )
)]
pub async fn about_us(State(state): State<AppState>) -> Json<ClinicInfoResponse> {
    Json(ClinicInfoResponse::from(&state.settings.clinic))
}

/// Target of access-denied redirects
#[utoipa::path(
    get,
    path = "/error/403",
    tag = "public",
    responses(
        (status = 403, description = "Localized access denied message", body = ErrorResponse)
    )
)]
pub async fn forbidden(locale: Locale) -> AppError {
    AppError::Forbidden(locale.t("error.forbidden").into())
}
