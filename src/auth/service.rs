//! Login sessions: access tokens plus rotating refresh tokens.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::error::{AuthError, Result};
use super::jwt::{Claims, TokenIssuer};
use super::password::{check_password_strength, PasswordHasher};
use super::{normalize_email, require_text};
use crate::domain::{now, Role, User};
use crate::interfaces::{TokenStore, UserStore};
use crate::utils::deadline::within;

/// Registration form.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// A logged-in user with fresh tokens.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user: User,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// 32 random bytes, base64url without padding.
fn new_refresh_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenStore>,
    issuer: TokenIssuer,
    hasher: PasswordHasher,
    refresh_ttl: Duration,
    deadline: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenStore>,
        issuer: TokenIssuer,
        hasher: PasswordHasher,
        refresh_ttl: Duration,
        deadline: Duration,
    ) -> Self {
        Self {
            users,
            tokens,
            issuer,
            hasher,
            refresh_ttl,
            deadline,
        }
    }

    /// Create a client account and log it in.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: Registration) -> Result<Session> {
        let name = require_text("name", &form.name)?;
        let surname = require_text("surname", &form.surname)?;
        let email = normalize_email(&form.email)?;
        check_password_strength(&form.password)?;

        if self.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken { email });
        }

        let at = now();
        let user = User {
            id: Uuid::new_v4(),
            name,
            surname,
            email,
            password_hash: self.hasher.hash(&form.password).await?,
            role: Role::Client,
            created_at: at,
            updated_at: at,
        };

        within(self.deadline, "insert_user", self.users.insert_user(&user))
            .await?
            .map_err(|e| AuthError::storage("insert_user", user.id, e))?;

        info!(user_id = %user.id, "User registered");
        self.start_session(user).await
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let user = self.authenticate(email, password).await?;
        self.start_session(user).await
    }

    /// Login restricted to staff accounts.
    #[instrument(skip(self, password))]
    pub async fn admin_login(&self, email: &str, password: &str) -> Result<Session> {
        let user = self.authenticate(email, password).await?;
        if !user.role.is_staff() {
            warn!(user_id = %user.id, role = %user.role, "Staff login refused");
            return Err(AuthError::Forbidden);
        }
        self.start_session(user).await
    }

    /// Trade a valid refresh token for a new token pair. The old refresh
    /// token stops working.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, user_id: Uuid, refresh_token: &str) -> Result<TokenPair> {
        let stored = within(
            self.deadline,
            "get_refresh_token",
            self.tokens.get_refresh_token(user_id),
        )
        .await?
        .map_err(|e| AuthError::storage("get_refresh_token", user_id, e))?;

        match stored {
            Some(token) if !refresh_token.is_empty() && token == refresh_token => {}
            _ => return Err(AuthError::InvalidRefreshToken),
        }

        let user = within(self.deadline, "get_user", self.users.get_user(user_id))
            .await?
            .map_err(|e| AuthError::storage("get_user", user_id, e))?
            .ok_or(AuthError::InvalidRefreshToken)?;

        self.issue_tokens(&user).await
    }

    /// Forget the user's refresh token. Access tokens run until they expire.
    #[instrument(skip(self))]
    pub async fn logout(&self, user_id: Uuid) -> Result<()> {
        within(
            self.deadline,
            "delete_refresh_token",
            self.tokens.delete_refresh_token(user_id),
        )
        .await?
        .map_err(|e| AuthError::storage("delete_refresh_token", user_id, e))?;
        info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// Validate a bearer access token.
    pub fn verify_access_token(&self, token: &str) -> Result<Claims> {
        self.issuer.verify(token).map_err(AuthError::InvalidToken)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let email = email.trim().to_lowercase();
        let user = self
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !self.hasher.verify(password, &user.password_hash).await? {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        within(self.deadline, "get_user_by_email", self.users.get_user_by_email(email))
            .await?
            .map_err(|e| AuthError::storage("get_user_by_email", email, e))
    }

    async fn start_session(&self, user: User) -> Result<Session> {
        let tokens = self.issue_tokens(&user).await?;
        Ok(Session { user, tokens })
    }

    async fn issue_tokens(&self, user: &User) -> Result<TokenPair> {
        let access_token = self.issuer.issue(user).map_err(AuthError::Signing)?;
        let refresh_token = new_refresh_token();

        within(
            self.deadline,
            "put_refresh_token",
            self.tokens
                .put_refresh_token(user.id, &refresh_token, self.refresh_ttl),
        )
        .await?
        .map_err(|e| AuthError::storage("put_refresh_token", user.id, e))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in: self.issuer.ttl().as_secs(),
        })
    }
}
