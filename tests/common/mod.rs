//! Shared fixtures for integration tests.
//!
//! Every fixture runs on its own in-memory SQLite database, so tests can run
//! in parallel without cleanup.

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use coffeehouse::auth::Registration;
use coffeehouse::config::{BootstrapAdminConfig, Config};
use coffeehouse::domain::{Money, Product, ProductCreate, User};
use coffeehouse::http::AppState;
use coffeehouse::storage::sql::sqlite::init_schema;
use coffeehouse::storage::{MemoryTokenStore, Stores};

pub const ADMIN_EMAIL: &str = "admin@coffeehouse.test";
pub const ADMIN_PASSWORD: &str = "admin-secret";

/// A fresh in-memory database with the schema applied.
///
/// One connection only: each `:memory:` connection is a separate database.
pub async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("Invalid SQLite URI")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory SQLite");
    init_schema(&pool).await.expect("Failed to create schema");
    pool
}

pub fn test_config() -> Config {
    let mut config = Config::for_test();
    config.auth.bootstrap_admin = Some(BootstrapAdminConfig {
        email: ADMIN_EMAIL.to_string(),
        password: ADMIN_PASSWORD.to_string(),
        ..Default::default()
    });
    config
}

pub struct Harness {
    pub pool: SqlitePool,
    pub stores: Stores,
    pub state: AppState,
    pub config: Config,
}

impl Harness {
    pub async fn new() -> Self {
        let pool = memory_pool().await;
        let stores = Stores::sqlite(pool.clone());
        let config = test_config();
        let state = AppState::new(&config, &stores, Arc::new(MemoryTokenStore::new()))
            .expect("Failed to build services");
        Self {
            pool,
            stores,
            state,
            config,
        }
    }

    pub async fn admin(&self) -> User {
        let admin = self
            .config
            .auth
            .bootstrap_admin
            .as_ref()
            .expect("bootstrap admin configured");
        self.state
            .users
            .ensure_admin(admin)
            .await
            .expect("Failed to create admin")
    }

    pub async fn customer(&self, email: &str) -> User {
        self.state
            .auth
            .register(Registration {
                name: "Ada".to_string(),
                surname: "Lovelace".to_string(),
                email: email.to_string(),
                password: "password1".to_string(),
            })
            .await
            .expect("Failed to register customer")
            .user
    }

    pub async fn product(&self, name: &str, price: i64) -> Product {
        self.state
            .catalog
            .create_product(ProductCreate {
                name: name.to_string(),
                category: "coffee".to_string(),
                description: format!("{name} from the test menu"),
                image_url: String::new(),
                price: Money::from_minor(price),
                is_active: true,
            })
            .await
            .expect("Failed to create product")
    }

    pub async fn row_count(&self, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count rows")
    }
}
