//! Authentication Handlers

use axum::{extract::State, http::StatusCode, response::Redirect, Json};
use validator::Validate;

use super::auth_service;
use crate::application::dto::request::{LoginRequest, RefreshTokenRequest, RegisterRequest};
use crate::application::dto::response::{RegisterResponse, TokenResponse, UserResponse};
use crate::application::services::{AuthService, NewAccount};
use crate::presentation::http::extractors::ApiJson;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::i18n::Locale;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Self-registration; the account gets the USER role
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 409, description = "Email or phone already registered", body = ErrorResponse),
        (status = 429, description = "Too many attempts", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    locale: Locale,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    body.validate().map_err(|e| validation_error(e, locale))?;

    let user = auth_service(&state)
        .register(NewAccount {
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            phone: body.phone,
            password: body.password,
        })
        .await
        .map_err(|e| e.localized(locale))?;

    let response = RegisterResponse {
        message: locale.t("success.user.created").to_string(),
        user: UserResponse::from(user),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with credentials; `redirect_to` is the landing page for the roles
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token pair and landing page", body = TokenResponse),
        (status = 400, description = "Missing fields", body = ErrorResponse),
        (status = 401, description = "Wrong email or password", body = ErrorResponse),
        (status = 429, description = "Too many attempts", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    locale: Locale,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    body.validate().map_err(|e| validation_error(e, locale))?;

    let (user, tokens) = auth_service(&state)
        .authenticate(&body.email, &body.password)
        .await
        .map_err(|e| e.localized(locale))?;

    let mut response = TokenResponse::from(tokens);
    response.redirect_to = Some(user.landing_path().to_string());
    Ok(Json(response))
}

/// Exchange a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Rotated token pair", body = TokenResponse),
        (status = 401, description = "Unknown, expired or revoked refresh token", body = ErrorResponse)
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    locale: Locale,
    ApiJson(body): ApiJson<RefreshTokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let tokens = auth_service(&state)
        .refresh_token(&body.refresh_token)
        .await
        .map_err(|e| e.localized(locale))?;

    Ok(Json(TokenResponse::from(tokens)))
}

/// Revoke the refresh token and send the client home
#[utoipa::path(
    post,
    path = "/logout",
    tag = "auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 303, description = "Session revoked, redirect to the home page")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RefreshTokenRequest>,
) -> Redirect {
    // unknown or already revoked tokens still log out
    if let Err(e) = auth_service(&state).revoke_token(&body.refresh_token).await {
        tracing::debug!(error = %e, "Logout with inactive session");
    }
    Redirect::to("/")
}

/// The authenticated user's profile
#[utoipa::path(
    get,
    path = "/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn me(
    State(state): State<AppState>,
    locale: Locale,
    auth: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = auth_service(&state)
        .current_user(auth.user_id)
        .await
        .map_err(|e| e.localized(locale))?;

    Ok(Json(UserResponse::from(user)))
}
