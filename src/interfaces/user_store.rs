//! User account storage interface.

use async_trait::async_trait;
use uuid::Uuid;

use super::Result;
use crate::domain::{Role, User};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `StorageError::Duplicate` if the email is taken.
    async fn insert_user(&self, user: &User) -> Result<()>;

    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Overwrite every mutable column. Returns false if the user is absent.
    async fn update_user(&self, user: &User) -> Result<bool>;

    /// Ordered by creation time.
    async fn list_users(&self) -> Result<Vec<User>>;

    async fn users_with_role(&self, role: Role) -> Result<Vec<User>>;
}
