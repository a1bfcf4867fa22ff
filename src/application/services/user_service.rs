//! User Service
//!
//! Administrative account management: listing, search, create, update and
//! delete with role assignment.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::services::auth_service::hash_password;
use crate::domain::{Role, RoleRepository, User, UserRepository};
use crate::shared::error::AppError;
use crate::shared::i18n::Locale;
use crate::shared::validation::{field_error, invalid_fields};

/// User service trait
#[async_trait]
pub trait UserService: Send + Sync {
    /// All users, or those whose name or email contains `search`
    async fn list(&self, search: Option<&str>) -> Result<Vec<User>, UserError>;

    async fn get(&self, id: i64) -> Result<User, UserError>;

    /// Roles offered by the admin form
    async fn roles(&self) -> Result<Vec<Role>, UserError>;

    /// Create a user; the password is required
    async fn create(&self, input: UserInput) -> Result<User, UserError>;

    /// Update a user; roles are replaced and an empty password keeps the
    /// current one
    async fn update(&self, id: i64, input: UserInput) -> Result<User, UserError>;

    /// Delete a user other than the acting administrator
    async fn delete(&self, actor_id: i64, id: i64) -> Result<(), UserError>;
}

/// Admin form input, already validated
#[derive(Debug, Clone)]
pub struct UserInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: Option<String>,
    pub role_ids: Vec<i64>,
}

/// User service errors
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Email already exists")]
    EmailExists,

    #[error("Phone already exists")]
    PhoneExists,

    #[error("Unknown role in selection")]
    InvalidRoles,

    #[error("A new account needs a password")]
    PasswordRequired,

    #[error("Administrators cannot delete their own account")]
    SelfDelete,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AppError> for UserError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::DuplicateField { field, .. } if field == "email" => UserError::EmailExists,
            AppError::DuplicateField { field, .. } if field == "phone" => UserError::PhoneExists,
            e => UserError::Internal(e.to_string()),
        }
    }
}

impl UserError {
    /// Convert into a localized HTTP error.
    pub fn localized(self, locale: Locale) -> AppError {
        match self {
            UserError::NotFound => AppError::NotFound(locale.t("error.user.notFound").into()),
            UserError::EmailExists => AppError::DuplicateField {
                field: "email".into(),
                message: locale.t("error.email.existing").into(),
            },
            UserError::PhoneExists => AppError::DuplicateField {
                field: "phone".into(),
                message: locale.t("error.phone.existing").into(),
            },
            UserError::InvalidRoles => invalid_fields(
                vec![field_error("role_ids", "error.roles.required", locale)],
                locale,
            ),
            UserError::PasswordRequired => invalid_fields(
                vec![field_error("password", "error.password.invalid", locale)],
                locale,
            ),
            UserError::SelfDelete => AppError::Conflict(locale.t("error.user.selfDelete").into()),
            UserError::Internal(detail) => AppError::Unexpected {
                message: locale.t("error.unexpected").into(),
                detail,
            },
        }
    }
}

/// UserService implementation
pub struct UserServiceImpl<U, R>
where
    U: UserRepository,
    R: RoleRepository,
{
    user_repo: Arc<U>,
    role_repo: Arc<R>,
}

impl<U, R> UserServiceImpl<U, R>
where
    U: UserRepository,
    R: RoleRepository,
{
    pub fn new(user_repo: Arc<U>, role_repo: Arc<R>) -> Self {
        Self {
            user_repo,
            role_repo,
        }
    }

    async fn ensure_unique(
        &self,
        email: &str,
        phone: &str,
        except_id: Option<i64>,
    ) -> Result<(), UserError> {
        if self.user_repo.email_exists(email, except_id).await? {
            return Err(UserError::EmailExists);
        }
        if self.user_repo.phone_exists(phone, except_id).await? {
            return Err(UserError::PhoneExists);
        }
        Ok(())
    }

    /// Every selected id must name an existing role.
    async fn resolve_roles(&self, role_ids: &[i64]) -> Result<Vec<i64>, UserError> {
        let mut ids = role_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        if ids.is_empty() {
            return Err(UserError::InvalidRoles);
        }

        let found = self.role_repo.find_by_ids(&ids).await?;
        if found.len() != ids.len() {
            return Err(UserError::InvalidRoles);
        }
        Ok(ids)
    }
}

#[async_trait]
impl<U, R> UserService for UserServiceImpl<U, R>
where
    U: UserRepository + 'static,
    R: RoleRepository + 'static,
{
    async fn list(&self, search: Option<&str>) -> Result<Vec<User>, UserError> {
        let users = match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => self.user_repo.search(term).await?,
            None => self.user_repo.list().await?,
        };
        Ok(users)
    }

    async fn get(&self, id: i64) -> Result<User, UserError> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn roles(&self) -> Result<Vec<Role>, UserError> {
        Ok(self.role_repo.list().await?)
    }

    async fn create(&self, input: UserInput) -> Result<User, UserError> {
        let password = input
            .password
            .filter(|p| !p.is_empty())
            .ok_or(UserError::PasswordRequired)?;
        self.ensure_unique(&input.email, &input.phone, None).await?;
        let role_ids = self.resolve_roles(&input.role_ids).await?;

        let user = User {
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            password_hash: hash_password(&password)?,
            ..User::default()
        };

        let created = self.user_repo.create(&user, &role_ids).await?;
        tracing::info!(user_id = created.id, roles = ?role_ids, "User created");
        Ok(created)
    }

    async fn update(&self, id: i64, input: UserInput) -> Result<User, UserError> {
        let mut user = self.get(id).await?;
        self.ensure_unique(&input.email, &input.phone, Some(id))
            .await?;
        let role_ids = self.resolve_roles(&input.role_ids).await?;

        user.first_name = input.first_name;
        user.last_name = input.last_name;
        user.email = input.email;
        user.phone = input.phone;
        if let Some(password) = input.password.filter(|p| !p.is_empty()) {
            user.password_hash = hash_password(&password)?;
        }

        let updated = self.user_repo.update(&user, &role_ids).await?;
        tracing::info!(user_id = id, roles = ?role_ids, "User updated");
        Ok(updated)
    }

    async fn delete(&self, actor_id: i64, id: i64) -> Result<(), UserError> {
        if actor_id == id {
            return Err(UserError::SelfDelete);
        }

        self.get(id).await?;
        self.user_repo.delete(id).await?;

        tracing::info!(user_id = id, actor_id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::auth_service::verify_password;
    use crate::domain::{MockRoleRepository, MockUserRepository, ROLE_ADMIN, ROLE_USER};
    use mockall::predicate::eq;
    use test_case::test_case;

    fn role(id: i64, name: &str) -> Role {
        Role {
            id,
            name: name.into(),
            description: None,
        }
    }

    fn existing_user() -> User {
        User {
            id: 5,
            first_name: "Juan".into(),
            last_name: "Pérez".into(),
            email: "juan@example.com".into(),
            phone: "3001234567".into(),
            password_hash: "old-hash".into(),
            roles: vec![role(2, ROLE_USER)],
            ..User::default()
        }
    }

    fn input(password: Option<&str>, role_ids: Vec<i64>) -> UserInput {
        UserInput {
            first_name: "Juana".into(),
            last_name: "Pérez".into(),
            email: "juana@example.com".into(),
            phone: "3007654321".into(),
            password: password.map(String::from),
            role_ids,
        }
    }

    fn unique_users() -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users.expect_email_exists().returning(|_, _| Ok(false));
        users.expect_phone_exists().returning(|_, _| Ok(false));
        users
    }

    fn roles_found() -> MockRoleRepository {
        let mut roles = MockRoleRepository::new();
        roles.expect_find_by_ids().returning(|ids| {
            Ok(ids
                .iter()
                .map(|id| role(*id, if *id == 1 { ROLE_ADMIN } else { ROLE_USER }))
                .collect())
        });
        roles
    }

    #[tokio::test]
    async fn test_list_uses_search_only_when_given() {
        let mut users = MockUserRepository::new();
        users.expect_list().times(1).returning(|| Ok(vec![existing_user()]));
        users
            .expect_search()
            .withf(|term| term == "juan")
            .times(1)
            .returning(|_| Ok(vec![]));
        let service = UserServiceImpl::new(Arc::new(users), Arc::new(MockRoleRepository::new()));

        assert_eq!(service.list(Some("  ")).await.unwrap().len(), 1);
        assert!(service.list(Some(" juan ")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_hashes_password_and_dedups_roles() {
        let mut users = unique_users();
        users
            .expect_create()
            .withf(|user, role_ids| {
                role_ids.to_vec() == vec![1, 2]
                    && verify_password("Secreto123", &user.password_hash).unwrap()
            })
            .times(1)
            .returning(|user, _| Ok(User { id: 9, ..user.clone() }));
        let service = UserServiceImpl::new(Arc::new(users), Arc::new(roles_found()));

        let created = service
            .create(input(Some("Secreto123"), vec![2, 1, 2]))
            .await
            .unwrap();
        assert_eq!(created.id, 9);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_role() {
        let mut roles = MockRoleRepository::new();
        roles.expect_find_by_ids().returning(|_| Ok(vec![role(2, ROLE_USER)]));
        let mut users = unique_users();
        users.expect_create().never();
        let service = UserServiceImpl::new(Arc::new(users), Arc::new(roles));

        let result = service.create(input(Some("Secreto123"), vec![2, 99])).await;
        assert!(matches!(result, Err(UserError::InvalidRoles)));
    }

    #[test_case(None ; "missing")]
    #[test_case(Some("") ; "empty")]
    #[tokio::test]
    async fn test_create_requires_password(password: Option<&str>) {
        let mut users = MockUserRepository::new();
        users.expect_create().never();
        let service = UserServiceImpl::new(Arc::new(users), Arc::new(MockRoleRepository::new()));

        let result = service.create(input(password, vec![2])).await;
        assert!(matches!(result, Err(UserError::PasswordRequired)));

        match UserError::PasswordRequired.localized(Locale::En) {
            AppError::Validation { errors, .. } => assert_eq!(errors[0].field, "password"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_phone() {
        let mut users = MockUserRepository::new();
        users.expect_email_exists().returning(|_, _| Ok(false));
        users.expect_phone_exists().returning(|_, _| Ok(true));
        let service = UserServiceImpl::new(Arc::new(users), Arc::new(roles_found()));

        let result = service.create(input(Some("Secreto123"), vec![2])).await;
        assert!(matches!(result, Err(UserError::PhoneExists)));
    }

    #[tokio::test]
    async fn test_update_keeps_password_when_empty() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .with(eq(5))
            .returning(|_| Ok(Some(existing_user())));
        users
            .expect_email_exists()
            .withf(|_, except| *except == Some(5))
            .returning(|_, _| Ok(false));
        users
            .expect_phone_exists()
            .withf(|_, except| *except == Some(5))
            .returning(|_, _| Ok(false));
        users
            .expect_update()
            .withf(|user, _| user.password_hash == "old-hash" && user.first_name == "Juana")
            .times(1)
            .returning(|user, _| Ok(user.clone()));
        let service = UserServiceImpl::new(Arc::new(users), Arc::new(roles_found()));

        let updated = service.update(5, input(Some(""), vec![2])).await.unwrap();
        assert_eq!(updated.email, "juana@example.com");
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));
        let service = UserServiceImpl::new(Arc::new(users), Arc::new(MockRoleRepository::new()));

        let result = service.update(404, input(None, vec![2])).await;
        assert!(matches!(result, Err(UserError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_self_is_refused() {
        let mut users = MockUserRepository::new();
        users.expect_delete().never();
        let service = UserServiceImpl::new(Arc::new(users), Arc::new(MockRoleRepository::new()));

        let result = service.delete(5, 5).await;
        assert!(matches!(result, Err(UserError::SelfDelete)));
    }

    #[tokio::test]
    async fn test_delete_other_user() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|_| Ok(Some(existing_user())));
        users.expect_delete().with(eq(5)).times(1).returning(|_| Ok(()));
        let service = UserServiceImpl::new(Arc::new(users), Arc::new(MockRoleRepository::new()));

        service.delete(1, 5).await.unwrap();
    }

    #[test]
    fn test_invalid_roles_become_field_error() {
        match UserError::InvalidRoles.localized(Locale::En) {
            AppError::Validation { errors, .. } => {
                assert_eq!(errors[0].field, "role_ids");
                assert_eq!(errors[0].message, "Select at least one role");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
