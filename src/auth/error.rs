//! Authentication and account errors.

use uuid::Uuid;

use crate::interfaces::StorageError;
use crate::utils::deadline::DeadlineExceeded;

pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Invalid(String),

    #[error("email {email} is already registered")]
    EmailTaken { email: String },

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("insufficient permissions")]
    Forbidden,

    #[error("invalid refresh token")]
    InvalidRefreshToken,

    #[error("invalid access token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("user {user_id} not found")]
    UserNotFound { user_id: Uuid },

    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("password hashing failed")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("{operation} failed for {target}")]
    Storage {
        operation: &'static str,
        target: String,
        #[source]
        source: StorageError,
    },

    #[error(transparent)]
    Deadline(#[from] DeadlineExceeded),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub(crate) fn storage(operation: &'static str, target: impl ToString, source: StorageError) -> Self {
        match source {
            StorageError::Duplicate { key, .. } => AuthError::EmailTaken { email: key },
            source => AuthError::Storage {
                operation,
                target: target.to_string(),
                source,
            },
        }
    }
}
