//! Role entity and repository trait.
//!
//! Maps to the `roles` table; users reference roles through `usuario_rol`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::error::AppError;

/// Name of the administrator role.
pub const ROLE_ADMIN: &str = "ADMIN";

/// Name of the role given to self-registered users.
pub const ROLE_USER: &str = "USER";

/// Authorization role.
///
/// Maps to the `roles` table:
/// - id_rol: BIGSERIAL PRIMARY KEY
/// - nombre: VARCHAR(50) NOT NULL UNIQUE
/// - descripcion: TEXT NULL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        self.name == ROLE_ADMIN
    }
}

/// Repository trait for Role data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Find a role by its unique name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AppError>;

    /// All roles ordered by name.
    async fn list(&self) -> Result<Vec<Role>, AppError>;

    /// Roles matching the given ids; unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Role>, AppError>;
}
