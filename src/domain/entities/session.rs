//! User Session entity and repository trait.
//!
//! Maps to the `user_sessions` table in the database schema.
//! Used for JWT refresh token management.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Represents a user session for JWT refresh token management.
///
/// Maps to the `user_sessions` table:
/// - id: UUID PRIMARY KEY
/// - user_id: BIGINT NOT NULL REFERENCES usuarios ON DELETE CASCADE
/// - refresh_token_hash: VARCHAR(64) NOT NULL (SHA-256 hex)
/// - expires_at: TIMESTAMPTZ NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - last_used_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - revoked_at: TIMESTAMPTZ NULL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,

    pub user_id: i64,

    /// SHA-256 hash of the refresh token (never store raw tokens)
    #[serde(skip_serializing)]
    pub refresh_token_hash: String,

    pub expires_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,

    /// When the refresh token was last rotated
    pub last_used_at: DateTime<Utc>,

    /// When the session was revoked (None if active)
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Create a new session.
    pub fn new(user_id: i64, refresh_token_hash: String, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            refresh_token_hash,
            expires_at,
            created_at: now,
            last_used_at: now,
            revoked_at: None,
        }
    }

    /// Check if the session is currently active (not expired, not revoked).
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none() && self.expires_at > Utc::now()
    }
}

/// Repository trait for Session data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Find a session by refresh token hash.
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, AppError>;

    async fn create(&self, session: &Session) -> Result<Session, AppError>;

    /// Replace the refresh token hash and expiry (token rotation).
    async fn rotate(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Revoke a session (set revoked_at).
    async fn revoke(&self, id: Uuid) -> Result<(), AppError>;

    /// Revoke all active sessions of a user.
    async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64, AppError>;

    /// Delete expired and revoked sessions.
    async fn cleanup_expired(&self) -> Result<u64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_session_is_active() {
        let session = Session::new(1, "hash".into(), Utc::now() + Duration::days(1));
        assert!(session.is_active());
    }

    #[test]
    fn test_expired_or_revoked_session_is_inactive() {
        let mut session = Session::new(1, "hash".into(), Utc::now() - Duration::seconds(1));
        assert!(!session.is_active());

        session.expires_at = Utc::now() + Duration::days(1);
        session.revoked_at = Some(Utc::now());
        assert!(!session.is_active());
    }
}
