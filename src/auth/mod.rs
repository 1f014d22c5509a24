//! Registration, login, token refresh and account administration.

mod error;
pub mod jwt;
pub mod password;
mod service;
mod users;

pub use error::{AuthError, Result};
pub use jwt::{Claims, TokenIssuer};
pub use password::PasswordHasher;
pub use service::{AuthService, Registration, Session, TokenPair};
pub use users::{ProfileUpdate, UserService};

/// Trim and lowercase an email, and require it to look like one.
pub(crate) fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AuthError::Invalid("email must not be empty".to_string()));
    }
    if !email.contains('@') {
        return Err(AuthError::Invalid("email is not valid".to_string()));
    }
    Ok(email)
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AuthError::Invalid(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}
