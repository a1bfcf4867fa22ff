//! Pet Handlers
//!
//! Pets are always scoped to the authenticated owner.

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use super::pet_service;
use crate::application::dto::request::PetRequest;
use crate::application::dto::response::{
    AppointmentResponse, MessageResponse, PetDetailResponse, PetResponse,
};
use crate::application::services::{PetInput, PetService};
use crate::presentation::http::extractors::{ApiJson, ApiPath};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::i18n::Locale;
use crate::shared::validation::{field_error, invalid_fields, validation_error};
use crate::startup::AppState;

fn pet_input(body: PetRequest, locale: Locale) -> Result<PetInput, AppError> {
    body.validate().map_err(|e| validation_error(e, locale))?;

    let birth_date = body.parsed_birth_date().ok_or_else(|| {
        invalid_fields(
            vec![field_error("birth_date", "error.pet.birthDate.invalid", locale)],
            locale,
        )
    })?;
    let sex = body.parsed_sex().ok_or_else(|| {
        invalid_fields(vec![field_error("sex", "error.pet.sex.invalid", locale)], locale)
    })?;

    Ok(PetInput {
        name: body.name,
        species: body.species,
        breed: body.breed,
        birth_date,
        sex,
    })
}

#[utoipa::path(
    get,
    path = "/mascotas",
    tag = "pets",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pets of the caller", body = [PetResponse]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn list_pets(
    State(state): State<AppState>,
    locale: Locale,
    auth: AuthUser,
) -> Result<Json<Vec<PetResponse>>, AppError> {
    let pets = pet_service(&state)
        .list(auth.user_id)
        .await
        .map_err(|e| e.localized(locale))?;

    Ok(Json(pets.into_iter().map(PetResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/mascotas",
    tag = "pets",
    security(("bearer_auth" = [])),
    request_body = PetRequest,
    responses(
        (status = 201, description = "Pet saved", body = MessageResponse<PetResponse>),
        (status = 400, description = "Invalid fields", body = ErrorResponse)
    )
)]
pub async fn create_pet(
    State(state): State<AppState>,
    locale: Locale,
    auth: AuthUser,
    ApiJson(body): ApiJson<PetRequest>,
) -> Result<(StatusCode, Json<MessageResponse<PetResponse>>), AppError> {
    let input = pet_input(body, locale)?;

    let pet = pet_service(&state)
        .create(auth.user_id, input)
        .await
        .map_err(|e| e.localized(locale))?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: locale.t("success.pet.saved").to_string(),
            data: Some(PetResponse::from(pet)),
        }),
    ))
}

/// Pet details with its appointment history
#[utoipa::path(
    get,
    path = "/mascotas/{id}",
    tag = "pets",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Pet id")),
    responses(
        (status = 200, description = "Pet with its appointment history", body = PetDetailResponse),
        (status = 403, description = "Pet of another user", body = ErrorResponse),
        (status = 404, description = "Unknown pet", body = ErrorResponse)
    )
)]
pub async fn get_pet(
    State(state): State<AppState>,
    locale: Locale,
    auth: AuthUser,
    ApiPath(pet_id): ApiPath<i64>,
) -> Result<Json<PetDetailResponse>, AppError> {
    let (pet, appointments) = pet_service(&state)
        .get(auth.user_id, pet_id)
        .await
        .map_err(|e| e.localized(locale))?;

    Ok(Json(PetDetailResponse {
        pet: PetResponse::from(pet),
        appointments: appointments
            .into_iter()
            .map(AppointmentResponse::from)
            .collect(),
    }))
}

#[utoipa::path(
    put,
    path = "/mascotas/{id}",
    tag = "pets",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Pet id")),
    request_body = PetRequest,
    responses(
        (status = 200, description = "Pet saved", body = MessageResponse<PetResponse>),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 403, description = "Pet of another user", body = ErrorResponse),
        (status = 404, description = "Unknown pet", body = ErrorResponse)
    )
)]
pub async fn update_pet(
    State(state): State<AppState>,
    locale: Locale,
    auth: AuthUser,
    ApiPath(pet_id): ApiPath<i64>,
    ApiJson(body): ApiJson<PetRequest>,
) -> Result<Json<MessageResponse<PetResponse>>, AppError> {
    let input = pet_input(body, locale)?;

    let pet = pet_service(&state)
        .update(auth.user_id, pet_id, input)
        .await
        .map_err(|e| e.localized(locale))?;

    Ok(Json(MessageResponse {
        message: locale.t("success.pet.saved").to_string(),
        data: Some(PetResponse::from(pet)),
    }))
}

/// Delete a pet; its appointments go with it
#[utoipa::path(
    delete,
    path = "/mascotas/{id}",
    tag = "pets",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Pet id")),
    responses(
        (status = 204, description = "Pet and its appointments deleted"),
        (status = 403, description = "Pet of another user", body = ErrorResponse),
        (status = 404, description = "Unknown pet", body = ErrorResponse)
    )
)]
pub async fn delete_pet(
    State(state): State<AppState>,
    locale: Locale,
    auth: AuthUser,
    ApiPath(pet_id): ApiPath<i64>,
) -> Result<StatusCode, AppError> {
    pet_service(&state)
        .delete(auth.user_id, pet_id)
        .await
        .map_err(|e| e.localized(locale))?;

    Ok(StatusCode::NO_CONTENT)
}
