//! Clinic Service Repository Implementation
//!
//! Read access to the `servicios` catalog.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{ClinicService, ClinicServiceRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct ClinicServiceRow {
    id: i64,
    name: String,
    description: String,
    active: bool,
}

impl From<ClinicServiceRow> for ClinicService {
    fn from(row: ClinicServiceRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            active: row.active,
        }
    }
}

#[derive(Clone)]
pub struct PgClinicServiceRepository {
    pool: PgPool,
}

impl PgClinicServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClinicServiceRepository for PgClinicServiceRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<ClinicService>, AppError> {
        let row = sqlx::query_as::<_, ClinicServiceRow>(
            r#"
            SELECT id_servicio AS id, nombre AS name, descripcion AS description, activo AS active
            FROM servicios
            WHERE id_servicio = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_active(&self) -> Result<Vec<ClinicService>, AppError> {
        let rows = sqlx::query_as::<_, ClinicServiceRow>(
            r#"
            SELECT id_servicio AS id, nombre AS name, descripcion AS description, activo AS active
            FROM servicios
            WHERE activo
            ORDER BY nombre
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
