//! Storage implementations.

use std::sync::Arc;
#[cfg(any(feature = "sqlite", feature = "postgres", feature = "redis"))]
use std::time::Duration;

#[cfg(any(feature = "sqlite", feature = "postgres", feature = "redis"))]
use backon::Retryable;
#[cfg(not(all(feature = "sqlite", feature = "postgres", feature = "redis")))]
use tracing::error;
use tracing::info;
#[cfg(any(feature = "sqlite", feature = "postgres", feature = "redis"))]
use tracing::warn;

use crate::config::{CacheConfig, CacheType, StorageConfig, StorageType};
#[cfg(any(feature = "sqlite", feature = "postgres", feature = "redis"))]
use crate::utils::retry::connection_backoff;

pub use crate::interfaces::{
    CatalogStore, OrderStore, Result, StorageError, TokenStore, UserStore,
};

pub mod memory;
pub mod mock;

#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod schema;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod sql;

#[cfg(feature = "redis")]
pub mod redis;

pub use memory::MemoryTokenStore;
pub use mock::{MockCatalogStore, MockOrderStore, MockUserStore};

#[cfg(feature = "redis")]
pub use redis::RedisTokenStore;

/// Error returned while bringing storage up at startup.
pub type InitError = Box<dyn std::error::Error + Send + Sync>;

/// The relational stores the services run on.
#[derive(Clone)]
pub struct Stores {
    pub catalog: Arc<dyn CatalogStore>,
    pub orders: Arc<dyn OrderStore>,
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    /// Stores sharing one SQLite pool. The schema must already exist.
    #[cfg(feature = "sqlite")]
    pub fn sqlite(pool: sqlx::SqlitePool) -> Self {
        use sql::sqlite::{SqliteCatalogStore, SqliteOrderStore, SqliteUserStore};

        Self {
            catalog: Arc::new(SqliteCatalogStore::new(pool.clone())),
            orders: Arc::new(SqliteOrderStore::new(pool.clone())),
            users: Arc::new(SqliteUserStore::new(pool)),
        }
    }

    /// Stores sharing one PostgreSQL pool. The schema must already exist.
    #[cfg(feature = "postgres")]
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        use sql::postgres::{PostgresCatalogStore, PostgresOrderStore, PostgresUserStore};

        Self {
            catalog: Arc::new(PostgresCatalogStore::new(pool.clone())),
            orders: Arc::new(PostgresOrderStore::new(pool.clone())),
            users: Arc::new(PostgresUserStore::new(pool)),
        }
    }
}

/// Initialize storage based on configuration.
///
/// Connects with retry, creates the schema if needed and returns the stores
/// for the configured backend.
pub async fn init_storage(config: &StorageConfig) -> std::result::Result<Stores, InitError> {
    info!(storage = %config.storage_type, "Initializing storage");

    match config.storage_type {
        #[cfg(feature = "sqlite")]
        StorageType::Sqlite => {
            use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

            let path = &config.sqlite.path;
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            let opts = SqliteConnectOptions::new()
                .filename(path)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(30))
                .foreign_keys(true)
                .create_if_missing(true);
            let max_connections = config.max_connections;
            let acquire_timeout = config.acquire_timeout();

            let pool = (|| {
                let opts = opts.clone();
                async move {
                    SqlitePoolOptions::new()
                        .max_connections(max_connections)
                        .acquire_timeout(acquire_timeout)
                        .connect_with(opts)
                        .await
                }
            })
            .retry(connection_backoff())
            .notify(|err: &sqlx::Error, dur: Duration| {
                warn!(path = %path, error = %err, delay = ?dur, "SQLite connection failed, retrying");
            })
            .await?;

            sql::sqlite::init_schema(&pool).await?;
            info!(path = %path, "SQLite storage ready");
            Ok(Stores::sqlite(pool))
        }
        #[cfg(not(feature = "sqlite"))]
        StorageType::Sqlite => {
            error!("SQLite storage requested but 'sqlite' feature is not enabled");
            Err("SQLite feature not enabled".into())
        }
        #[cfg(feature = "postgres")]
        StorageType::Postgres => {
            use sqlx::postgres::PgPoolOptions;

            let uri = config.postgres.uri.clone();
            let max_connections = config.max_connections;
            let acquire_timeout = config.acquire_timeout();

            let pool = (|| {
                let uri = uri.clone();
                async move {
                    PgPoolOptions::new()
                        .max_connections(max_connections)
                        .acquire_timeout(acquire_timeout)
                        .connect(&uri)
                        .await
                }
            })
            .retry(connection_backoff())
            .notify(|err: &sqlx::Error, dur: Duration| {
                warn!(error = %err, delay = ?dur, "PostgreSQL connection failed, retrying");
            })
            .await?;

            sql::postgres::init_schema(&pool).await?;
            info!("PostgreSQL storage ready");
            Ok(Stores::postgres(pool))
        }
        #[cfg(not(feature = "postgres"))]
        StorageType::Postgres => {
            error!("PostgreSQL storage requested but 'postgres' feature is not enabled");
            Err("PostgreSQL feature not enabled".into())
        }
    }
}

/// Initialize the refresh token cache based on configuration.
pub async fn init_token_store(
    config: &CacheConfig,
) -> std::result::Result<Arc<dyn TokenStore>, InitError> {
    match config.cache_type {
        CacheType::Memory => {
            info!("Refresh tokens: in-memory cache");
            Ok(Arc::new(MemoryTokenStore::new()))
        }
        #[cfg(feature = "redis")]
        CacheType::Redis => {
            let url = config.redis.url.as_str();
            let prefix = config.redis.key_prefix.as_str();

            let store = (|| RedisTokenStore::new(url, Some(prefix)))
                .retry(connection_backoff())
                .notify(|err: &StorageError, dur: Duration| {
                    warn!(url = %url, error = %err, delay = ?dur, "Redis connection failed, retrying");
                })
                .await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "redis"))]
        CacheType::Redis => {
            error!("Redis cache requested but 'redis' feature is not enabled");
            Err("Redis feature not enabled".into())
        }
    }
}
