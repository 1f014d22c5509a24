//! Abstract interfaces for coffeehouse storage.
//!
//! These traits define the contracts for:
//! - Catalog storage (products)
//! - Order storage (headers and lines, written atomically)
//! - User storage (accounts)
//! - Token storage (refresh tokens with expiry)

pub mod catalog_store;
pub mod order_store;
pub mod token_store;
pub mod user_store;

pub use catalog_store::CatalogStore;
pub use order_store::OrderStore;
pub use token_store::TokenStore;
pub use user_store::UserStore;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Duplicate {entity}: {key}")]
    Duplicate { entity: &'static str, key: String },

    #[error("Corrupt {table} row: {detail}")]
    Corrupt { table: &'static str, detail: String },

    #[error("Invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(#[from] chrono::ParseError),

    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error(transparent)]
    Timeout(#[from] crate::utils::deadline::DeadlineExceeded),
}
