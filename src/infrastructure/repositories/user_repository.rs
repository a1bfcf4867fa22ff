//! User Repository Implementation
//!
//! PostgreSQL implementation of the UserRepository trait.
//! Maps between the `usuarios`/`usuario_rol` tables and the domain User.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::{Role, User, UserRepository};
use crate::shared::error::AppError;

const USER_COLUMNS: &str = r#"
    u.id_usuario AS id, u.nombre AS first_name, u.apellido AS last_name,
    u.email, u.telefono AS phone, u.contrasena AS password_hash,
    u.fecha_registro AS registered_at
"#;

/// Database row representation of the usuarios table.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    password_hash: String,
    registered_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert database row to domain User entity.
    fn into_user(self, roles: Vec<Role>) -> User {
        User {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            password_hash: self.password_hash,
            registered_at: self.registered_at,
            roles,
        }
    }
}

/// Role row tagged with the user it belongs to.
#[derive(Debug, sqlx::FromRow)]
struct UserRoleRow {
    user_id: i64,
    id: i64,
    name: String,
    description: Option<String>,
}

/// Translate a unique violation on `usuarios` into a field conflict.
fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some("usuarios_email_key") => "email",
                Some("usuarios_telefono_key") => "phone",
                _ => "user",
            };
            return AppError::DuplicateField {
                field: field.to_string(),
                message: format!("{} already registered", field),
            };
        }
    }
    AppError::Database(e)
}

/// Substring pattern for `ILIKE ... ESCAPE '\'`; the term's own wildcards
/// match literally.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// PostgreSQL user repository implementation.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load roles for a set of users in one query.
    async fn roles_for(&self, user_ids: &[i64]) -> Result<HashMap<i64, Vec<Role>>, AppError> {
        let rows = sqlx::query_as::<_, UserRoleRow>(
            r#"
            SELECT ur.id_usuario AS user_id, r.id_rol AS id, r.nombre_rol AS name,
                   r.descripcion AS description
            FROM usuario_rol ur
            JOIN roles r ON r.id_rol = ur.id_rol
            WHERE ur.id_usuario = ANY($1)
            ORDER BY r.nombre_rol
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_user: HashMap<i64, Vec<Role>> = HashMap::new();
        for row in rows {
            by_user.entry(row.user_id).or_default().push(Role {
                id: row.id,
                name: row.name,
                description: row.description,
            });
        }
        Ok(by_user)
    }

    async fn attach_roles(&self, rows: Vec<UserRow>) -> Result<Vec<User>, AppError> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut roles = self.roles_for(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let user_roles = roles.remove(&row.id).unwrap_or_default();
                row.into_user(user_roles)
            })
            .collect())
    }

    async fn attach_one(&self, row: Option<UserRow>) -> Result<Option<User>, AppError> {
        match row {
            Some(row) => Ok(self.attach_roles(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn replace_roles(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        role_ids: &[i64],
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM usuario_rol WHERE id_usuario = $1")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO usuario_rol (id_usuario, id_rol)
            SELECT $1, UNNEST($2::BIGINT[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role_ids)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM usuarios u WHERE u.id_usuario = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        self.attach_one(row).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM usuarios u WHERE LOWER(u.email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        self.attach_one(row).await
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM usuarios u ORDER BY u.id_usuario"
        ))
        .fetch_all(&self.pool)
        .await?;

        self.attach_roles(rows).await
    }

    async fn search(&self, term: &str) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM usuarios u
            WHERE u.nombre ILIKE $1 ESCAPE '\' OR u.email ILIKE $1 ESCAPE '\'
            ORDER BY u.id_usuario
            "#
        ))
        .bind(contains_pattern(term.trim()))
        .fetch_all(&self.pool)
        .await?;

        self.attach_roles(rows).await
    }

    async fn email_exists(&self, email: &str, except_id: Option<i64>) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM usuarios
                WHERE LOWER(email) = LOWER($1) AND ($2::BIGINT IS NULL OR id_usuario <> $2)
            )
            "#,
        )
        .bind(email)
        .bind(except_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn phone_exists(&self, phone: &str, except_id: Option<i64>) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM usuarios
                WHERE telefono = $1 AND ($2::BIGINT IS NULL OR id_usuario <> $2)
            )
            "#,
        )
        .bind(phone)
        .bind(except_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create(&self, user: &User, role_ids: &[i64]) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO usuarios (nombre, apellido, email, telefono, contrasena)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id_usuario
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        Self::replace_roles(&mut tx, id, role_ids).await?;
        tx.commit().await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("User {} vanished after insert", id)))
    }

    async fn update(&self, user: &User, role_ids: &[i64]) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE usuarios
            SET nombre = $2,
                apellido = $3,
                email = $4,
                telefono = $5,
                contrasena = $6
            WHERE id_usuario = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .execute(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", user.id)));
        }

        Self::replace_roles(&mut tx, user.id, role_ids).await?;
        tx.commit().await?;

        self.find_by_id(user.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user.id)))
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM usuarios WHERE id_usuario = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }

        Ok(())
    }
}
