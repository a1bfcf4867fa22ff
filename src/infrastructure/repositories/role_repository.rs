//! Role Repository Implementation
//!
//! PostgreSQL implementation of the RoleRepository trait.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{Role, RoleRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct RoleRow {
    id: i64,
    name: String,
    description: Option<String>,
}

impl RoleRow {
    fn into_role(self) -> Role {
        Role {
            id: self.id,
            name: self.name,
            description: self.description,
        }
    }
}

/// PostgreSQL role repository implementation.
#[derive(Clone)]
pub struct PgRoleRepository {
    pool: PgPool,
}

impl PgRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for PgRoleRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id_rol AS id, nombre_rol AS name, descripcion AS description
            FROM roles
            WHERE nombre_rol = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RoleRow::into_role))
    }

    async fn list(&self) -> Result<Vec<Role>, AppError> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id_rol AS id, nombre_rol AS name, descripcion AS description
            FROM roles
            ORDER BY nombre_rol
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RoleRow::into_role).collect())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Role>, AppError> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id_rol AS id, nombre_rol AS name, descripcion AS description
            FROM roles
            WHERE id_rol = ANY($1)
            ORDER BY nombre_rol
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RoleRow::into_role).collect())
    }
}
