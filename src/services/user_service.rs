use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;

use crate::database::entities::{user_sessions, users};
use crate::errors::{CoreError, CoreResult};
use crate::services::ValidationService;

/// Account and session administration. Sign-in itself happens upstream; this
/// service provisions users and hands out bearer sessions for them.
#[derive(Clone, Debug)]
pub struct UserService {
    db: DatabaseConnection,
    session_ttl: chrono::Duration,
}

impl UserService {
    pub fn new(db: DatabaseConnection, session_ttl: chrono::Duration) -> Self {
        Self { db, session_ttl }
    }

    pub async fn create_user(
        &self,
        email: &str,
        display_name: &str,
        role: users::UserRole,
    ) -> CoreResult<users::Model> {
        let email = ValidationService::validate_email(email)?.to_lowercase();
        let display_name = ValidationService::validate_name("display_name", display_name)?;

        let mut user = users::ActiveModel::new();
        user.email = Set(email);
        user.display_name = Set(display_name);
        user.role = Set(role.as_str().to_string());

        let user = user
            .insert(&self.db)
            .await
            .map_err(|e| CoreError::from_db("create user", e))?;

        info!(user_id = user.id, role = %role, "created user");
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> CoreResult<users::Model> {
        let email = email.trim().to_lowercase();
        users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(&self.db)
            .await
            .map_err(|e| CoreError::from_db("find user", e))?
            .ok_or_else(|| CoreError::not_found("User", email))
    }

    /// Issue a fresh bearer session for an active user.
    pub async fn issue_session(&self, email: &str) -> CoreResult<user_sessions::Model> {
        let user = self.find_by_email(email).await?;
        if !user.is_active {
            return Err(CoreError::invalid_input("Account is deactivated"));
        }

        let session = user_sessions::ActiveModel::new(user.id, self.session_ttl)
            .insert(&self.db)
            .await
            .map_err(|e| CoreError::from_db("create session", e))?;

        let user_id = user.id;
        let user: users::ActiveModel = user.into();
        user.set_last_signed_in()
            .update(&self.db)
            .await
            .map_err(|e| CoreError::from_db("record sign-in", e))?;

        info!(user_id, "issued session");
        Ok(session)
    }
}
