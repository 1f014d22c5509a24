//! Refresh token cache interface.

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::Result;

/// One live refresh token per user.
///
/// Implementations:
/// - `MemoryTokenStore`: in-process map with expiry
/// - `RedisTokenStore`: Redis keys with `EX`
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Replace the user's refresh token. It expires after `ttl`.
    async fn put_refresh_token(&self, user_id: Uuid, token: &str, ttl: Duration) -> Result<()>;

    /// `None` if no token was stored or it has expired.
    async fn get_refresh_token(&self, user_id: Uuid) -> Result<Option<String>>;

    async fn delete_refresh_token(&self, user_id: Uuid) -> Result<()>;
}

/// Cache key for a user's refresh token.
pub fn refresh_token_key(user_id: Uuid) -> String {
    format!("refresh_token:{user_id}")
}
