//! Token and password configuration.

use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing key for access tokens.
    pub jwt_secret: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    /// bcrypt work factor (4..=31).
    pub bcrypt_cost: u32,
    /// Admin account created at startup if no user has its email.
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me".to_string(),
            access_token_ttl_secs: 15 * 60,
            refresh_token_ttl_secs: 7 * 24 * 60 * 60,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            bootstrap_admin: None,
        }
    }
}

impl AuthConfig {
    pub fn access_token_ttl(&self) -> Duration {
        Duration::from_secs(self.access_token_ttl_secs)
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_token_ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BootstrapAdminConfig {
    pub email: String,
    pub password: String,
    pub name: String,
    pub surname: String,
}

impl Default for BootstrapAdminConfig {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            name: "Admin".to_string(),
            surname: "Admin".to_string(),
        }
    }
}
