//! Application configuration.
//!
//! Aggregates configuration from all modules into a single Config struct
//! that can be loaded from YAML files or environment variables.

mod auth;
mod server;
mod storage;

pub use auth::{AuthConfig, BootstrapAdminConfig};
pub use server::{OrdersConfig, ServerConfig};
pub use storage::{
    CacheConfig, CacheType, PostgresConfig, RedisConfig, SqliteConfig, StorageConfig, StorageType,
};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "COFFEEHOUSE_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "COFFEEHOUSE";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "COFFEEHOUSE_LOG";

use serde::Deserialize;

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Relational storage configuration.
    pub storage: StorageConfig,
    /// Refresh token cache configuration.
    pub cache: CacheConfig,
    /// Token and password settings.
    pub auth: AuthConfig,
    /// Order query settings.
    pub orders: OrdersConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    pub fn load(path: Option<&str>) -> Result<Self, ::config::ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Create config for testing.
    ///
    /// In-memory token cache, minimum bcrypt cost and a fixed JWT secret.
    pub fn for_test() -> Self {
        let mut config = Self::default();
        config.auth.jwt_secret = "test-secret".to_string();
        config.auth.bcrypt_cost = 4;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.storage_type, StorageType::Sqlite);
        assert_eq!(config.cache.cache_type, CacheType::Memory);
        assert!(config.auth.bootstrap_admin.is_none());
        assert_eq!(config.orders.utc_offset_minutes, 0);
    }

    #[test]
    fn test_config_for_test() {
        let config = Config::for_test();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.auth.bcrypt_cost, 4);
    }

    #[test]
    fn test_config_from_yaml() {
        use ::config::{Config as ConfigLib, File, FileFormat};

        let yaml = r#"
server:
  port: 9090
storage:
  type: postgres
  postgres:
    uri: postgres://db/coffee
cache:
  type: redis
auth:
  jwt_secret: s3cret
  bootstrap_admin:
    email: owner@example.com
    password: changeme
orders:
  utc_offset_minutes: 120
"#;
        let config: Config = ConfigLib::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.storage.storage_type, StorageType::Postgres);
        assert_eq!(config.storage.postgres.uri, "postgres://db/coffee");
        assert_eq!(config.cache.cache_type, CacheType::Redis);
        assert_eq!(config.auth.jwt_secret, "s3cret");
        let admin = config.auth.bootstrap_admin.unwrap();
        assert_eq!(admin.email, "owner@example.com");
        assert_eq!(admin.name, "Admin");
        assert_eq!(config.orders.utc_offset_minutes, 120);
    }
}
