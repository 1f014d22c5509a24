//! Unified SQL storage implementations.
//!
//! This module provides shared implementations for SQL-based storage backends
//! (PostgreSQL, SQLite). The implementations are parameterized by database type
//! using the `SqlDatabase` trait.

mod catalog_store;
mod order_store;
mod query;
mod user_store;

pub use catalog_store::SqlCatalogStore;
pub use order_store::SqlOrderStore;
pub use query::SqlDatabase;
pub use user_store::SqlUserStore;

#[cfg(feature = "postgres")]
pub mod postgres {
    //! PostgreSQL database backend.

    use sea_query::PostgresQueryBuilder;
    use sqlx::PgPool;

    use crate::storage::schema::POSTGRES_SCHEMA;

    /// PostgreSQL database marker type.
    pub struct Postgres;

    impl super::SqlDatabase for Postgres {
        type Pool = PgPool;
        type Row = sqlx::postgres::PgRow;

        fn build_select(stmt: sea_query::SelectStatement) -> String {
            stmt.to_string(PostgresQueryBuilder)
        }

        fn build_insert(stmt: sea_query::InsertStatement) -> String {
            stmt.to_string(PostgresQueryBuilder)
        }

        fn build_update(stmt: sea_query::UpdateStatement) -> String {
            stmt.to_string(PostgresQueryBuilder)
        }

        fn build_delete(stmt: sea_query::DeleteStatement) -> String {
            stmt.to_string(PostgresQueryBuilder)
        }
    }

    /// Create tables and indexes if they do not exist.
    pub async fn init_schema(pool: &PgPool) -> crate::interfaces::Result<()> {
        for stmt in POSTGRES_SCHEMA {
            sqlx::query(stmt).execute(pool).await?;
        }
        Ok(())
    }

    /// PostgreSQL catalog store.
    pub type PostgresCatalogStore = super::SqlCatalogStore<Postgres>;

    /// PostgreSQL order store.
    pub type PostgresOrderStore = super::SqlOrderStore<Postgres>;

    /// PostgreSQL user store.
    pub type PostgresUserStore = super::SqlUserStore<Postgres>;
}

#[cfg(feature = "sqlite")]
pub mod sqlite {
    //! SQLite database backend.

    use sea_query::SqliteQueryBuilder;
    use sqlx::SqlitePool;

    use crate::storage::schema::SQLITE_SCHEMA;

    /// SQLite database marker type.
    pub struct Sqlite;

    impl super::SqlDatabase for Sqlite {
        type Pool = SqlitePool;
        type Row = sqlx::sqlite::SqliteRow;

        fn build_select(stmt: sea_query::SelectStatement) -> String {
            stmt.to_string(SqliteQueryBuilder)
        }

        fn build_insert(stmt: sea_query::InsertStatement) -> String {
            stmt.to_string(SqliteQueryBuilder)
        }

        fn build_update(stmt: sea_query::UpdateStatement) -> String {
            stmt.to_string(SqliteQueryBuilder)
        }

        fn build_delete(stmt: sea_query::DeleteStatement) -> String {
            stmt.to_string(SqliteQueryBuilder)
        }
    }

    /// Create tables and indexes if they do not exist.
    pub async fn init_schema(pool: &SqlitePool) -> crate::interfaces::Result<()> {
        for stmt in SQLITE_SCHEMA {
            sqlx::query(stmt).execute(pool).await?;
        }
        Ok(())
    }

    /// SQLite catalog store.
    pub type SqliteCatalogStore = super::SqlCatalogStore<Sqlite>;

    /// SQLite order store.
    pub type SqliteOrderStore = super::SqlOrderStore<Sqlite>;

    /// SQLite user store.
    pub type SqliteUserStore = super::SqlUserStore<Sqlite>;
}
