//! Admin User Management Handlers
//!
//! Mounted behind `require_admin`.

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use super::user_service;
use crate::application::dto::request::{CreateUserRequest, UpdateUserRequest, UserSearchQuery};
use crate::application::dto::response::{
    MessageResponse, RoleListResponse, UserListResponse, UserResponse,
};
use crate::application::services::{UserInput, UserService};
use crate::presentation::http::extractors::{ApiJson, ApiPath, ApiQuery};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::i18n::Locale;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Users matching `search` on name or email, or all users
#[utoipa::path(
    get,
    path = "/admin/usuarios",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(UserSearchQuery),
    responses(
        (status = 200, description = "Matching users", body = UserListResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not an administrator", body = ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    locale: Locale,
    ApiQuery(query): ApiQuery<UserSearchQuery>,
) -> Result<Json<UserListResponse>, AppError> {
    let users = user_service(&state)
        .list(query.search.as_deref())
        .await
        .map_err(|e| e.localized(locale))?;

    Ok(Json(UserListResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
        search: query.search,
    }))
}

#[utoipa::path(
    get,
    path = "/admin/usuarios/roles",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Assignable roles", body = RoleListResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not an administrator", body = ErrorResponse)
    )
)]
pub async fn list_roles(
    State(state): State<AppState>,
    locale: Locale,
) -> Result<Json<RoleListResponse>, AppError> {
    let roles = user_service(&state)
        .roles()
        .await
        .map_err(|e| e.localized(locale))?;

    Ok(Json(RoleListResponse { roles }))
}

#[utoipa::path(
    post,
    path = "/admin/usuarios",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = MessageResponse<UserResponse>),
        (status = 400, description = "Invalid fields or roles", body = ErrorResponse),
        (status = 409, description = "Email or phone already registered", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not an administrator", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    locale: Locale,
    ApiJson(body): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<MessageResponse<UserResponse>>), AppError> {
    body.validate().map_err(|e| validation_error(e, locale))?;

    let user = user_service(&state)
        .create(UserInput {
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            phone: body.phone,
            password: Some(body.password),
            role_ids: body.role_ids,
        })
        .await
        .map_err(|e| e.localized(locale))?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: locale.t("success.user.created").to_string(),
            data: Some(UserResponse::from(user)),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/admin/usuarios/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User with roles", body = UserResponse),
        (status = 404, description = "Unknown user", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not an administrator", body = ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    locale: Locale,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_service(&state)
        .get(id)
        .await
        .map_err(|e| e.localized(locale))?;

    Ok(Json(UserResponse::from(user)))
}

/// Update a user; roles are replaced and an empty password is kept
#[utoipa::path(
    put,
    path = "/admin/usuarios/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = MessageResponse<UserResponse>),
        (status = 400, description = "Invalid fields or roles", body = ErrorResponse),
        (status = 404, description = "Unknown user", body = ErrorResponse),
        (status = 409, description = "Email or phone already registered", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not an administrator", body = ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    locale: Locale,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<UpdateUserRequest>,
) -> Result<Json<MessageResponse<UserResponse>>, AppError> {
    body.validate().map_err(|e| validation_error(e, locale))?;

    let user = user_service(&state)
        .update(
            id,
            UserInput {
                first_name: body.first_name,
                last_name: body.last_name,
                email: body.email,
                phone: body.phone,
                password: body.password,
                role_ids: body.role_ids,
            },
        )
        .await
        .map_err(|e| e.localized(locale))?;

    Ok(Json(MessageResponse {
        message: locale.t("success.user.updated").to_string(),
        data: Some(UserResponse::from(user)),
    }))
}

#[utoipa::path(
    delete,
    path = "/admin/usuarios/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "Unknown user", body = ErrorResponse),
        (status = 409, description = "Administrators cannot delete themselves", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not an administrator", body = ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    locale: Locale,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, AppError> {
    user_service(&state)
        .delete(auth.user_id, id)
        .await
        .map_err(|e| e.localized(locale))?;

    Ok(StatusCode::NO_CONTENT)
}
