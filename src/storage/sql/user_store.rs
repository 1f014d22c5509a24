//! Unified SQL UserStore implementation.

use std::marker::PhantomData;

use super::SqlDatabase;
use crate::storage::schema::Users;

const USER_COLUMNS: [Users; 8] = [
    Users::Id,
    Users::Name,
    Users::Surname,
    Users::Email,
    Users::PasswordHash,
    Users::Role,
    Users::CreatedAt,
    Users::UpdatedAt,
];

/// SQL-based implementation of UserStore.
pub struct SqlUserStore<DB: SqlDatabase> {
    pool: DB::Pool,
    _marker: PhantomData<DB>,
}

impl<DB: SqlDatabase> SqlUserStore<DB> {
    pub fn new(pool: DB::Pool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }
}

/// Macro to implement UserStore for a specific SQL backend.
macro_rules! impl_user_store {
    ($db_type:ty, $feature:literal) => {
        #[cfg(feature = $feature)]
        impl SqlUserStore<$db_type> {
            fn user_from_row(
                row: &<$db_type as SqlDatabase>::Row,
            ) -> crate::interfaces::Result<crate::domain::User> {
                use sqlx::Row;

                use super::query::{parse_role, parse_timestamp, parse_uuid};

                Ok(crate::domain::User {
                    id: parse_uuid(&row.try_get::<String, _>("id")?)?,
                    name: row.try_get("name")?,
                    surname: row.try_get("surname")?,
                    email: row.try_get("email")?,
                    password_hash: row.try_get("password_hash")?,
                    role: parse_role(&row.try_get::<String, _>("role")?)?,
                    created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
                    updated_at: parse_timestamp(&row.try_get::<String, _>("updated_at")?)?,
                })
            }

            /// Run a rendered user query.
            async fn fetch_users(
                &self,
                sql: String,
            ) -> crate::interfaces::Result<Vec<crate::domain::User>> {
                let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
                rows.iter().map(Self::user_from_row).collect()
            }
        }

        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::interfaces::UserStore for SqlUserStore<$db_type> {
            async fn insert_user(&self, user: &crate::domain::User) -> crate::interfaces::Result<()> {
                use sea_query::Query;

                use super::query::unique_violation;
                use crate::storage::schema::timestamp;

                let sql = <$db_type>::build_insert(
                    Query::insert()
                        .into_table(Users::Table)
                        .columns(USER_COLUMNS)
                        .values_panic([
                            user.id.to_string().into(),
                            user.name.clone().into(),
                            user.surname.clone().into(),
                            user.email.clone().into(),
                            user.password_hash.clone().into(),
                            user.role.as_str().into(),
                            timestamp(user.created_at).into(),
                            timestamp(user.updated_at).into(),
                        ])
                        .to_owned(),
                );
                sqlx::query(&sql)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| unique_violation(e, "email", &user.email))?;
                Ok(())
            }

            async fn get_user(
                &self,
                id: uuid::Uuid,
            ) -> crate::interfaces::Result<Option<crate::domain::User>> {
                use sea_query::{Expr, Query};

                let sql = <$db_type>::build_select(
                    Query::select()
                        .columns(USER_COLUMNS)
                        .from(Users::Table)
                        .and_where(Expr::col(Users::Id).eq(id.to_string()))
                        .to_owned(),
                );
                Ok(self.fetch_users(sql).await?.into_iter().next())
            }

            async fn get_user_by_email(
                &self,
                email: &str,
            ) -> crate::interfaces::Result<Option<crate::domain::User>> {
                use sea_query::{Expr, Query};

                let sql = <$db_type>::build_select(
                    Query::select()
                        .columns(USER_COLUMNS)
                        .from(Users::Table)
                        .and_where(Expr::col(Users::Email).eq(email))
                        .to_owned(),
                );
                Ok(self.fetch_users(sql).await?.into_iter().next())
            }

            async fn update_user(&self, user: &crate::domain::User) -> crate::interfaces::Result<bool> {
                use sea_query::{Expr, Query};

                use super::query::unique_violation;
                use crate::storage::schema::timestamp;

                let sql = <$db_type>::build_update(
                    Query::update()
                        .table(Users::Table)
                        .values([
                            (Users::Name, user.name.clone().into()),
                            (Users::Surname, user.surname.clone().into()),
                            (Users::Email, user.email.clone().into()),
                            (Users::PasswordHash, user.password_hash.clone().into()),
                            (Users::Role, user.role.as_str().into()),
                            (Users::UpdatedAt, timestamp(user.updated_at).into()),
                        ])
                        .and_where(Expr::col(Users::Id).eq(user.id.to_string()))
                        .to_owned(),
                );
                let result = sqlx::query(&sql)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| unique_violation(e, "email", &user.email))?;
                Ok(result.rows_affected() > 0)
            }

            async fn list_users(&self) -> crate::interfaces::Result<Vec<crate::domain::User>> {
                use sea_query::{Order, Query};

                let sql = <$db_type>::build_select(
                    Query::select()
                        .columns(USER_COLUMNS)
                        .from(Users::Table)
                        .order_by(Users::CreatedAt, Order::Asc)
                        .to_owned(),
                );
                self.fetch_users(sql).await
            }

            async fn users_with_role(
                &self,
                role: crate::domain::Role,
            ) -> crate::interfaces::Result<Vec<crate::domain::User>> {
                use sea_query::{Expr, Order, Query};

                let sql = <$db_type>::build_select(
                    Query::select()
                        .columns(USER_COLUMNS)
                        .from(Users::Table)
                        .and_where(Expr::col(Users::Role).eq(role.as_str()))
                        .order_by(Users::CreatedAt, Order::Asc)
                        .to_owned(),
                );
                self.fetch_users(sql).await
            }
        }
    };
}

// Generate implementations for each SQL backend
impl_user_store!(super::postgres::Postgres, "postgres");
impl_user_store!(super::sqlite::Sqlite, "sqlite");
