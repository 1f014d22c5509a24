//! Redis TokenStore implementation.

use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use tracing::{debug, info};
use uuid::Uuid;

use crate::interfaces::token_store::refresh_token_key;
use crate::interfaces::{Result, TokenStore};

/// Redis refresh token store.
///
/// One key per user; Redis expires it with `SET .. EX`.
pub struct RedisTokenStore {
    conn: ConnectionManager,
    key_prefix: String,
}

impl RedisTokenStore {
    /// Create a new Redis token store.
    ///
    /// # Arguments
    /// * `url` - Redis connection URL (e.g., redis://localhost:6379)
    /// * `key_prefix` - Prefix for all keys (default: "coffeehouse")
    pub async fn new(url: &str, key_prefix: Option<&str>) -> Result<Self> {
        let client = Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;

        info!(url = %url, "Connected to Redis for refresh tokens");

        Ok(Self {
            conn,
            key_prefix: key_prefix.unwrap_or("coffeehouse").to_string(),
        })
    }

    fn token_key(&self, user_id: Uuid) -> String {
        format!("{}:{}", self.key_prefix, refresh_token_key(user_id))
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn put_refresh_token(&self, user_id: Uuid, token: &str, ttl: Duration) -> Result<()> {
        let key = self.token_key(user_id);
        let mut conn = self.conn.clone();

        let _: () = conn.set_ex(&key, token, ttl.as_secs().max(1)).await?;

        debug!(user_id = %user_id, "Stored refresh token in Redis");
        Ok(())
    }

    async fn get_refresh_token(&self, user_id: Uuid) -> Result<Option<String>> {
        let key = self.token_key(user_id);
        let mut conn = self.conn.clone();

        let token: Option<String> = conn.get(&key).await?;
        Ok(token)
    }

    async fn delete_refresh_token(&self, user_id: Uuid) -> Result<()> {
        let key = self.token_key(user_id);
        let mut conn = self.conn.clone();

        let _: () = conn.del(&key).await?;

        debug!(user_id = %user_id, "Deleted refresh token from Redis");
        Ok(())
    }
}
