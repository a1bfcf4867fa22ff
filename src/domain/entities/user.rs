//! User entity and repository trait.
//!
//! Maps to the `usuarios` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::{Role, ROLE_ADMIN, ROLE_USER};
use crate::shared::error::AppError;

/// Represents a clinic customer or staff account.
///
/// Maps to the `usuarios` table:
/// - id_usuario: BIGSERIAL PRIMARY KEY
/// - nombre: VARCHAR(50) NOT NULL
/// - apellido: VARCHAR(50) NOT NULL
/// - email: VARCHAR(255) NOT NULL UNIQUE
/// - telefono: VARCHAR(10) NOT NULL UNIQUE
/// - contrasena: VARCHAR(255) NOT NULL (argon2 hash)
/// - fecha_registro: TIMESTAMPTZ NOT NULL DEFAULT NOW()
///
/// Roles come from the `usuario_rol` join table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    pub first_name: String,

    pub last_name: String,

    /// Email address (unique)
    pub email: String,

    /// Ten digit phone number (unique)
    pub phone: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Set by the database on insert
    pub registered_at: DateTime<Utc>,

    #[serde(default)]
    pub roles: Vec<Role>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|r| r.name == name)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.name.clone()).collect()
    }

    /// Landing page after login: the admin area for administrators, the pet
    /// list for customers, the home page otherwise.
    pub fn landing_path(&self) -> &'static str {
        if self.has_role(ROLE_ADMIN) {
            "/admin/usuarios"
        } else if self.has_role(ROLE_USER) {
            "/mascotas"
        } else {
            "/"
        }
    }
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: 0,
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            password_hash: String::new(),
            registered_at: Utc::now(),
            roles: Vec::new(),
        }
    }
}

/// Repository trait for User data access operations.
///
/// Implementations of this trait handle the actual database interactions.
/// The trait is defined in the domain layer to maintain dependency inversion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by id, roles included.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Find a user by email address, roles included.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// All users ordered by id.
    async fn list(&self) -> Result<Vec<User>, AppError>;

    /// Users whose first name, last name or email contain `term`,
    /// ignoring case.
    async fn search(&self, term: &str) -> Result<Vec<User>, AppError>;

    /// Check if an email is registered to a user other than `except_id`.
    async fn email_exists(&self, email: &str, except_id: Option<i64>) -> Result<bool, AppError>;

    /// Check if a phone is registered to a user other than `except_id`.
    async fn phone_exists(&self, phone: &str, except_id: Option<i64>) -> Result<bool, AppError>;

    /// Insert a user and link the given roles in one transaction.
    async fn create(&self, user: &User, role_ids: &[i64]) -> Result<User, AppError>;

    /// Update profile fields and password hash, replacing all roles.
    async fn update(&self, user: &User, role_ids: &[i64]) -> Result<User, AppError>;

    /// Delete a user; pets, appointments and sessions cascade.
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}
