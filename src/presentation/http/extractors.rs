//! Custom Extractors
//!
//! Authenticated user lookup and JSON, path and query extractors whose
//! rejections become localized `400` errors.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::i18n::Locale;
use crate::startup::AppState;

fn malformed(locale: Locale) -> AppError {
    AppError::BadRequest(locale.t("error.request.malformed").into())
}

/// Requires `auth_middleware` to have run on the route.
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }
        let locale = Locale::from_request_parts(parts, state)
            .await
            .unwrap_or_default();
        Err(AppError::Unauthorized(locale.t("error.unauthorized").into()))
    }
}

/// JSON body extractor.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<T> FromRequest<AppState> for ApiJson<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let locale = Locale::from_request_parts(&mut parts, state)
            .await
            .unwrap_or_default();
        let req = Request::from_parts(parts, body);

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "Rejected JSON body");
                Err(malformed(locale))
            }
        }
    }
}

/// Path parameter extractor.
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

impl<T> FromRequestParts<AppState> for ApiPath<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ApiPath(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "Rejected path parameters");
                let locale = Locale::from_request_parts(parts, state)
                    .await
                    .unwrap_or_default();
                Err(malformed(locale))
            }
        }
    }
}

/// Query string extractor.
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

impl<T> FromRequestParts<AppState> for ApiQuery<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ApiQuery(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "Rejected query string");
                let locale = Locale::from_request_parts(parts, state)
                    .await
                    .unwrap_or_default();
                Err(malformed(locale))
            }
        }
    }
}
