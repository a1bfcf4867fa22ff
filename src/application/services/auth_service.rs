//! Authentication Service
//!
//! Handles registration, credential checks, JWT access tokens and refresh
//! token sessions.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::JwtSettings;
use crate::domain::{RoleRepository, Session, SessionRepository, User, UserRepository, ROLE_USER};
use crate::shared::error::AppError;
use crate::shared::i18n::Locale;

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a customer account with the `USER` role
    async fn register(&self, account: NewAccount) -> Result<User, AuthError>;

    /// Authenticate user with credentials
    async fn authenticate(&self, email: &str, password: &str)
        -> Result<(User, AuthTokens), AuthError>;

    /// Refresh access token using refresh token
    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, AuthError>;

    /// Revoke refresh token (logout)
    async fn revoke_token(&self, refresh_token: &str) -> Result<(), AuthError>;

    /// Load the account behind an access token subject
    async fn current_user(&self, user_id: i64) -> Result<User, AuthError>;
}

/// Registration input, already validated
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// Authentication tokens response
#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Role names at issue time
    #[serde(default)]
    pub roles: Vec<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// JWT ID for token revocation tracking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Email already exists")]
    EmailExists,

    #[error("Phone already exists")]
    PhoneExists,

    #[error("Session not found or expired")]
    SessionNotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AppError> for AuthError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::DuplicateField { field, .. } if field == "email" => AuthError::EmailExists,
            AppError::DuplicateField { field, .. } if field == "phone" => AuthError::PhoneExists,
            e => AuthError::Internal(e.to_string()),
        }
    }
}

impl AuthError {
    /// Convert into a localized HTTP error.
    pub fn localized(self, locale: Locale) -> AppError {
        match self {
            AuthError::InvalidCredentials => {
                AppError::Unauthorized(locale.t("error.credentials.invalid").into())
            }
            AuthError::TokenExpired | AuthError::InvalidToken | AuthError::SessionNotFound => {
                AppError::Unauthorized(locale.t("error.session.invalid").into())
            }
            AuthError::UserNotFound => AppError::NotFound(locale.t("error.user.notFound").into()),
            AuthError::EmailExists => AppError::DuplicateField {
                field: "email".into(),
                message: locale.t("error.email.existing").into(),
            },
            AuthError::PhoneExists => AppError::DuplicateField {
                field: "phone".into(),
                message: locale.t("error.phone.existing").into(),
            },
            AuthError::Internal(detail) => AppError::Unexpected {
                message: locale.t("error.unexpected").into(),
                detail,
            },
        }
    }
}

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Signs and checks access tokens.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiry_minutes: i64,
}

impl TokenCodec {
    pub fn new(settings: &JwtSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            access_token_expiry_minutes: settings.access_token_expiry_minutes,
        }
    }

    /// Access token lifetime in seconds
    pub fn expires_in(&self) -> i64 {
        self.access_token_expiry_minutes * 60
    }

    /// Issue an access token carrying the user's roles.
    pub fn encode(&self, user_id: i64, roles: Vec<String>) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            roles,
            exp: (now + Duration::minutes(self.access_token_expiry_minutes)).timestamp(),
            iat: now.timestamp(),
            jti: Some(uuid::Uuid::new_v4().to_string()),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Decode and validate access token
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }
}

/// AuthService implementation
pub struct AuthServiceImpl<U, R, S>
where
    U: UserRepository,
    R: RoleRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    role_repo: Arc<R>,
    session_repo: Arc<S>,
    tokens: Arc<TokenCodec>,
    refresh_token_expiry_days: i64,
}

impl<U, R, S> AuthServiceImpl<U, R, S>
where
    U: UserRepository,
    R: RoleRepository,
    S: SessionRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        role_repo: Arc<R>,
        session_repo: Arc<S>,
        tokens: Arc<TokenCodec>,
        refresh_token_expiry_days: i64,
    ) -> Self {
        Self {
            user_repo,
            role_repo,
            session_repo,
            tokens,
            refresh_token_expiry_days,
        }
    }

    /// Generate access and opaque refresh tokens
    fn generate_tokens(&self, user: &User) -> Result<AuthTokens, AuthError> {
        let access_token = self.tokens.encode(user.id, user.role_names())?;
        let refresh_token = format!("{}.{}", uuid::Uuid::new_v4(), uuid::Uuid::new_v4());

        Ok(AuthTokens {
            access_token,
            refresh_token,
            expires_in: self.tokens.expires_in(),
            token_type: "Bearer".to_string(),
        })
    }

    /// Hash refresh token for storage
    fn hash_refresh_token(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn refresh_expiry(&self) -> chrono::DateTime<Utc> {
        Utc::now() + Duration::days(self.refresh_token_expiry_days)
    }
}

#[async_trait]
impl<U, R, S> AuthService for AuthServiceImpl<U, R, S>
where
    U: UserRepository + 'static,
    R: RoleRepository + 'static,
    S: SessionRepository + 'static,
{
    async fn register(&self, account: NewAccount) -> Result<User, AuthError> {
        if self.user_repo.email_exists(&account.email, None).await? {
            return Err(AuthError::EmailExists);
        }
        if self.user_repo.phone_exists(&account.phone, None).await? {
            return Err(AuthError::PhoneExists);
        }

        let role = self
            .role_repo
            .find_by_name(ROLE_USER)
            .await?
            .ok_or_else(|| AuthError::Internal(format!("Role {} is not seeded", ROLE_USER)))?;

        let user = User {
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            phone: account.phone,
            password_hash: hash_password(&account.password)?,
            ..User::default()
        };

        let created = self.user_repo.create(&user, &[role.id]).await?;
        tracing::info!(user_id = created.id, "User registered");

        Ok(created)
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(User, AuthTokens), AuthError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(user_id = user.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.generate_tokens(&user)?;

        let session = Session::new(
            user.id,
            self.hash_refresh_token(&tokens.refresh_token),
            self.refresh_expiry(),
        );
        self.session_repo.create(&session).await?;

        Ok((user, tokens))
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, AuthError> {
        let token_hash = self.hash_refresh_token(refresh_token);

        let session = self
            .session_repo
            .find_by_token_hash(&token_hash)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        if !session.is_active() {
            return Err(AuthError::TokenExpired);
        }

        // roles may have changed since the session started
        let user = self
            .user_repo
            .find_by_id(session.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let tokens = self.generate_tokens(&user)?;
        self.session_repo
            .rotate(
                session.id,
                &self.hash_refresh_token(&tokens.refresh_token),
                self.refresh_expiry(),
            )
            .await?;

        Ok(tokens)
    }

    async fn revoke_token(&self, refresh_token: &str) -> Result<(), AuthError> {
        let token_hash = self.hash_refresh_token(refresh_token);

        let session = self
            .session_repo
            .find_by_token_hash(&token_hash)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        self.session_repo.revoke(session.id).await?;
        Ok(())
    }

    async fn current_user(&self, user_id: i64) -> Result<User, AuthError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockRoleRepository, MockSessionRepository, MockUserRepository, Role};
    use mockall::predicate::{always, eq};

    fn jwt_settings() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-that-is-long-enough-1234567890".into(),
            access_token_expiry_minutes: 15,
            refresh_token_expiry_days: 7,
        }
    }

    fn service(
        users: MockUserRepository,
        roles: MockRoleRepository,
        sessions: MockSessionRepository,
    ) -> AuthServiceImpl<MockUserRepository, MockRoleRepository, MockSessionRepository> {
        AuthServiceImpl::new(
            Arc::new(users),
            Arc::new(roles),
            Arc::new(sessions),
            Arc::new(TokenCodec::new(&jwt_settings())),
            7,
        )
    }

    fn account() -> NewAccount {
        NewAccount {
            first_name: "Camila".into(),
            last_name: "Rodríguez".into(),
            email: "camila@example.com".into(),
            phone: "3104567890".into(),
            password: "Secreto123".into(),
        }
    }

    fn stored_user(password: &str) -> User {
        User {
            id: 7,
            first_name: "Camila".into(),
            last_name: "Rodríguez".into(),
            email: "camila@example.com".into(),
            phone: "3104567890".into(),
            password_hash: hash_password(password).unwrap(),
            roles: vec![Role {
                id: 2,
                name: ROLE_USER.into(),
                description: None,
            }],
            ..User::default()
        }
    }

    #[test]
    fn test_password_hashing() {
        let hash = hash_password("Secreto123").unwrap();
        assert_ne!(hash, "Secreto123");
        assert!(verify_password("Secreto123", &hash).unwrap());
        assert!(!verify_password("secreto123", &hash).unwrap());
    }

    #[test]
    fn test_token_roundtrip_keeps_roles() {
        let codec = TokenCodec::new(&jwt_settings());
        let token = codec.encode(42, vec!["ADMIN".into()]).unwrap();

        let claims = codec.decode(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.roles, vec!["ADMIN".to_string()]);
        assert!(claims.jti.is_some());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let mut other = jwt_settings();
        other.secret = "another-secret-that-is-long-enough-0987654321".into();
        let token = TokenCodec::new(&other).encode(1, vec![]).unwrap();

        let result = TokenCodec::new(&jwt_settings()).decode(&token);
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_register_assigns_user_role() {
        let mut users = MockUserRepository::new();
        users.expect_email_exists().returning(|_, _| Ok(false));
        users.expect_phone_exists().returning(|_, _| Ok(false));
        users
            .expect_create()
            .withf(|user, role_ids| {
                role_ids.to_vec() == vec![2] && user.password_hash.starts_with("$argon2")
            })
            .times(1)
            .returning(|user, _| {
                Ok(User {
                    id: 10,
                    ..user.clone()
                })
            });

        let mut roles = MockRoleRepository::new();
        roles
            .expect_find_by_name()
            .withf(|name| name == ROLE_USER)
            .returning(|_| {
                Ok(Some(Role {
                    id: 2,
                    name: ROLE_USER.into(),
                    description: None,
                }))
            });

        let user = service(users, roles, MockSessionRepository::new())
            .register(account())
            .await
            .unwrap();
        assert_eq!(user.id, 10);
    }

    #[tokio::test]
    async fn test_register_rejects_existing_email() {
        let mut users = MockUserRepository::new();
        users.expect_email_exists().returning(|_, _| Ok(true));
        users.expect_create().never();

        let result = service(users, MockRoleRepository::new(), MockSessionRepository::new())
            .register(account())
            .await;
        assert!(matches!(result, Err(AuthError::EmailExists)));
    }

    #[tokio::test]
    async fn test_register_maps_phone_race_to_duplicate() {
        let mut users = MockUserRepository::new();
        users.expect_email_exists().returning(|_, _| Ok(false));
        users.expect_phone_exists().returning(|_, _| Ok(false));
        users.expect_create().returning(|_, _| {
            Err(AppError::DuplicateField {
                field: "phone".into(),
                message: "taken".into(),
            })
        });
        let mut roles = MockRoleRepository::new();
        roles.expect_find_by_name().returning(|_| {
            Ok(Some(Role {
                id: 2,
                name: ROLE_USER.into(),
                description: None,
            }))
        });

        let result = service(users, roles, MockSessionRepository::new())
            .register(account())
            .await;
        assert!(matches!(result, Err(AuthError::PhoneExists)));
    }

    #[tokio::test]
    async fn test_authenticate_creates_session() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(stored_user("Secreto123"))));
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_create()
            .with(always())
            .times(1)
            .returning(|s| Ok(s.clone()));

        let (user, tokens) = service(users, MockRoleRepository::new(), sessions)
            .authenticate("camila@example.com", "Secreto123")
            .await
            .unwrap();

        assert_eq!(user.landing_path(), "/mascotas");
        assert_eq!(tokens.token_type, "Bearer");
        assert_eq!(tokens.expires_in, 15 * 60);
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(stored_user("Secreto123"))));
        let mut sessions = MockSessionRepository::new();
        sessions.expect_create().never();

        let result = service(users, MockRoleRepository::new(), sessions)
            .authenticate("camila@example.com", "Otra12345")
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_refresh_rotates_session() {
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_find_by_token_hash()
            .returning(|hash| {
                Ok(Some(Session::new(
                    7,
                    hash.to_string(),
                    Utc::now() + Duration::days(1),
                )))
            });
        sessions
            .expect_rotate()
            .times(1)
            .returning(|_, _, _| Ok(()));
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .with(eq(7))
            .returning(|_| Ok(Some(stored_user("Secreto123"))));

        let tokens = service(users, MockRoleRepository::new(), sessions)
            .refresh_token("old.token")
            .await
            .unwrap();
        assert_ne!(tokens.refresh_token, "old.token");
    }

    #[tokio::test]
    async fn test_refresh_rejects_revoked_session() {
        let mut sessions = MockSessionRepository::new();
        sessions.expect_find_by_token_hash().returning(|hash| {
            let mut session = Session::new(7, hash.to_string(), Utc::now() + Duration::days(1));
            session.revoked_at = Some(Utc::now());
            Ok(Some(session))
        });
        sessions.expect_rotate().never();

        let result = service(MockUserRepository::new(), MockRoleRepository::new(), sessions)
            .refresh_token("old.token")
            .await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_localized_errors() {
        let err = AuthError::InvalidCredentials.localized(Locale::En);
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "Unauthorized: Invalid email or password");

        let err = AuthError::EmailExists.localized(Locale::Es);
        assert_eq!(err.status(), axum::http::StatusCode::CONFLICT);
    }
}
