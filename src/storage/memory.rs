//! In-process refresh token store.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::interfaces::{Result, TokenStore};

/// Refresh tokens held in memory with an expiry per entry.
///
/// Tokens do not survive a restart. Expired entries are dropped when read.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<HashMap<Uuid, (String, Instant)>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn put_refresh_token(&self, user_id: Uuid, token: &str, ttl: Duration) -> Result<()> {
        let expires_at = Instant::now() + ttl;
        self.tokens
            .write()
            .await
            .insert(user_id, (token.to_string(), expires_at));
        Ok(())
    }

    async fn get_refresh_token(&self, user_id: Uuid) -> Result<Option<String>> {
        let mut tokens = self.tokens.write().await;
        match tokens.get(&user_id) {
            Some((token, expires_at)) if *expires_at > Instant::now() => Ok(Some(token.clone())),
            Some(_) => {
                tokens.remove(&user_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete_refresh_token(&self, user_id: Uuid) -> Result<()> {
        self.tokens.write().await.remove(&user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_replaces_previous_token() {
        let store = MemoryTokenStore::new();
        let user = Uuid::new_v4();
        store
            .put_refresh_token(user, "a", Duration::from_secs(60))
            .await
            .unwrap();
        store
            .put_refresh_token(user, "b", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            store.get_refresh_token(user).await.unwrap().as_deref(),
            Some("b")
        );
    }

    #[tokio::test]
    async fn test_expired_token_is_gone() {
        let store = MemoryTokenStore::new();
        let user = Uuid::new_v4();
        store
            .put_refresh_token(user, "a", Duration::ZERO)
            .await
            .unwrap();
        assert!(store.get_refresh_token(user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryTokenStore::new();
        let user = Uuid::new_v4();
        store
            .put_refresh_token(user, "a", Duration::from_secs(60))
            .await
            .unwrap();
        store.delete_refresh_token(user).await.unwrap();
        assert!(store.get_refresh_token(user).await.unwrap().is_none());
    }
}
