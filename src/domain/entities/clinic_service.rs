//! Clinic service entity and repository trait.
//!
//! Maps to the `servicios` table. The catalog is seeded by migrations and
//! is read-only at runtime.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::error::AppError;

/// A bookable service such as a general consultation or vaccination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClinicService {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub active: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClinicServiceRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<ClinicService>, AppError>;

    /// Active services ordered by name.
    async fn list_active(&self) -> Result<Vec<ClinicService>, AppError>;
}
