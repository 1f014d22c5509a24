//! Profile management and account administration.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use super::error::{AuthError, Result};
use super::password::{check_password_strength, PasswordHasher};
use super::{normalize_email, require_text};
use crate::config::BootstrapAdminConfig;
use crate::domain::{now, Role, User};
use crate::interfaces::{TokenStore, UserStore};
use crate::utils::deadline::within;

/// Partial profile change; `None` keeps the current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
}

pub struct UserService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenStore>,
    hasher: PasswordHasher,
    deadline: Duration,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenStore>,
        hasher: PasswordHasher,
        deadline: Duration,
    ) -> Self {
        Self {
            users,
            tokens,
            hasher,
            deadline,
        }
    }

    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: Uuid) -> Result<User> {
        self.get_user(user_id).await
    }

    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<User> {
        let mut user = self.get_user(user_id).await?;
        if let Some(name) = update.name {
            user.name = require_text("name", &name)?;
        }
        if let Some(surname) = update.surname {
            user.surname = require_text("surname", &surname)?;
        }
        if let Some(email) = update.email {
            user.email = normalize_email(&email)?;
        }
        user.updated_at = now();
        self.save(&user).await?;
        info!(user_id = %user_id, "Profile updated");
        Ok(user)
    }

    /// Replace the password after checking the current one. Outstanding
    /// refresh tokens are revoked.
    #[instrument(skip(self, old_password, new_password))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let mut user = self.get_user(user_id).await?;
        if !self.hasher.verify(old_password, &user.password_hash).await? {
            return Err(AuthError::InvalidCredentials);
        }
        check_password_strength(new_password)?;

        user.password_hash = self.hasher.hash(new_password).await?;
        user.updated_at = now();
        self.save(&user).await?;

        within(
            self.deadline,
            "delete_refresh_token",
            self.tokens.delete_refresh_token(user_id),
        )
        .await?
        .map_err(|e| AuthError::storage("delete_refresh_token", user_id, e))?;

        info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: Uuid) -> Result<User> {
        within(self.deadline, "get_user", self.users.get_user(user_id))
            .await?
            .map_err(|e| AuthError::storage("get_user", user_id, e))?
            .ok_or(AuthError::UserNotFound { user_id })
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>> {
        within(self.deadline, "list_users", self.users.list_users())
            .await?
            .map_err(|e| AuthError::storage("list_users", "users", e))
    }

    #[instrument(skip(self))]
    pub async fn users_with_role(&self, role: Role) -> Result<Vec<User>> {
        within(self.deadline, "users_with_role", self.users.users_with_role(role))
            .await?
            .map_err(|e| AuthError::storage("users_with_role", role, e))
    }

    /// Create the configured admin account unless its email is already
    /// registered. Returns the account either way.
    #[instrument(skip(self, admin), fields(email = %admin.email))]
    pub async fn ensure_admin(&self, admin: &BootstrapAdminConfig) -> Result<User> {
        let email = normalize_email(&admin.email)?;
        let existing = within(self.deadline, "get_user_by_email", self.users.get_user_by_email(&email))
            .await?
            .map_err(|e| AuthError::storage("get_user_by_email", &email, e))?;
        if let Some(user) = existing {
            return Ok(user);
        }

        check_password_strength(&admin.password)?;
        let at = now();
        let user = User {
            id: Uuid::new_v4(),
            name: require_text("name", &admin.name)?,
            surname: require_text("surname", &admin.surname)?,
            email,
            password_hash: self.hasher.hash(&admin.password).await?,
            role: Role::Admin,
            created_at: at,
            updated_at: at,
        };
        within(self.deadline, "insert_user", self.users.insert_user(&user))
            .await?
            .map_err(|e| AuthError::storage("insert_user", user.id, e))?;

        info!(user_id = %user.id, "Bootstrap admin created");
        Ok(user)
    }

    async fn save(&self, user: &User) -> Result<()> {
        let updated = within(self.deadline, "update_user", self.users.update_user(user))
            .await?
            .map_err(|e| AuthError::storage("update_user", user.id, e))?;
        if !updated {
            return Err(AuthError::UserNotFound { user_id: user.id });
        }
        Ok(())
    }
}
