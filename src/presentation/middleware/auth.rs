//! Authentication Middleware
//!
//! JWT validation for protected routes and role checks for the admin area.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::domain::ROLE_ADMIN;
use crate::shared::error::AppError;
use crate::shared::i18n::Locale;
use crate::startup::AppState;

/// Authenticated user extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    /// Role names carried by the access token
    pub roles: Vec<String>,
}

impl AuthUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }
}

/// Pull the bearer token out of the Authorization header.
fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let unauthorized = || AppError::Unauthorized(locale.t("error.unauthorized").into());

    let token = bearer_token(&request).ok_or_else(unauthorized)?;

    let claims = state.tokens.decode(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected access token");
        unauthorized()
    })?;

    let user_id: i64 = claims.sub.parse().map_err(|_| unauthorized())?;

    request.extensions_mut().insert(AuthUser {
        user_id,
        roles: claims.roles,
    });

    Ok(next.run(request).await)
}

/// Only administrators pass; runs after `auth_middleware`.
pub async fn require_admin(
    locale: Locale,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match request.extensions().get::<AuthUser>() {
        Some(user) if user.is_admin() => Ok(next.run(request).await),
        Some(user) => {
            tracing::warn!(user_id = user.user_id, path = %request.uri().path(), "Admin route denied");
            Err(AppError::Forbidden(locale.t("error.forbidden").into()))
        }
        None => Err(AppError::Unauthorized(locale.t("error.unauthorized").into())),
    }
}
