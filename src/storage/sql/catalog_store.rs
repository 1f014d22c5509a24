//! Unified SQL CatalogStore implementation.

use std::marker::PhantomData;

use super::SqlDatabase;
use crate::storage::schema::Products;

/// Columns read back for a product, in row order.
const PRODUCT_COLUMNS: [Products; 9] = [
    Products::Id,
    Products::Name,
    Products::Category,
    Products::Description,
    Products::ImageUrl,
    Products::Price,
    Products::IsActive,
    Products::CreatedAt,
    Products::UpdatedAt,
];

/// SQL-based implementation of CatalogStore.
pub struct SqlCatalogStore<DB: SqlDatabase> {
    pool: DB::Pool,
    _marker: PhantomData<DB>,
}

impl<DB: SqlDatabase> SqlCatalogStore<DB> {
    pub fn new(pool: DB::Pool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }
}

/// Macro to implement CatalogStore for a specific SQL backend.
macro_rules! impl_catalog_store {
    ($db_type:ty, $feature:literal) => {
        #[cfg(feature = $feature)]
        impl SqlCatalogStore<$db_type> {
            fn product_from_row(
                row: &<$db_type as SqlDatabase>::Row,
            ) -> crate::interfaces::Result<crate::domain::Product> {
                use sqlx::Row;

                use super::query::{parse_timestamp, parse_uuid};

                Ok(crate::domain::Product {
                    id: parse_uuid(&row.try_get::<String, _>("id")?)?,
                    name: row.try_get("name")?,
                    category: row.try_get("category")?,
                    description: row.try_get("description")?,
                    image_url: row.try_get("image_url")?,
                    price: crate::domain::Money::from_minor(row.try_get::<i64, _>("price")?),
                    is_active: row.try_get("is_active")?,
                    created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
                    updated_at: parse_timestamp(&row.try_get::<String, _>("updated_at")?)?,
                })
            }
        }

        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::interfaces::CatalogStore for SqlCatalogStore<$db_type> {
            async fn insert_product(
                &self,
                product: &crate::domain::Product,
            ) -> crate::interfaces::Result<()> {
                use sea_query::Query;

                use crate::storage::schema::timestamp;

                let sql = <$db_type>::build_insert(
                    Query::insert()
                        .into_table(Products::Table)
                        .columns(PRODUCT_COLUMNS)
                        .values_panic([
                            product.id.to_string().into(),
                            product.name.clone().into(),
                            product.category.clone().into(),
                            product.description.clone().into(),
                            product.image_url.clone().into(),
                            product.price.minor_units().into(),
                            product.is_active.into(),
                            timestamp(product.created_at).into(),
                            timestamp(product.updated_at).into(),
                        ])
                        .to_owned(),
                );
                sqlx::query(&sql).execute(&self.pool).await?;
                Ok(())
            }

            async fn get_product(
                &self,
                id: uuid::Uuid,
            ) -> crate::interfaces::Result<Option<crate::domain::Product>> {
                use sea_query::{Expr, Query};

                let sql = <$db_type>::build_select(
                    Query::select()
                        .columns(PRODUCT_COLUMNS)
                        .from(Products::Table)
                        .and_where(Expr::col(Products::Id).eq(id.to_string()))
                        .to_owned(),
                );
                let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;
                row.as_ref().map(Self::product_from_row).transpose()
            }

            async fn update_product(
                &self,
                product: &crate::domain::Product,
            ) -> crate::interfaces::Result<bool> {
                use sea_query::{Expr, Query};

                use crate::storage::schema::timestamp;

                let sql = <$db_type>::build_update(
                    Query::update()
                        .table(Products::Table)
                        .values([
                            (Products::Name, product.name.clone().into()),
                            (Products::Category, product.category.clone().into()),
                            (Products::Description, product.description.clone().into()),
                            (Products::ImageUrl, product.image_url.clone().into()),
                            (Products::Price, product.price.minor_units().into()),
                            (Products::IsActive, product.is_active.into()),
                            (Products::UpdatedAt, timestamp(product.updated_at).into()),
                        ])
                        .and_where(Expr::col(Products::Id).eq(product.id.to_string()))
                        .to_owned(),
                );
                let result = sqlx::query(&sql).execute(&self.pool).await?;
                Ok(result.rows_affected() > 0)
            }

            async fn delete_product(&self, id: uuid::Uuid) -> crate::interfaces::Result<bool> {
                use sea_query::{Expr, Query};

                let sql = <$db_type>::build_delete(
                    Query::delete()
                        .from_table(Products::Table)
                        .and_where(Expr::col(Products::Id).eq(id.to_string()))
                        .to_owned(),
                );
                let result = sqlx::query(&sql).execute(&self.pool).await?;
                Ok(result.rows_affected() > 0)
            }

            async fn list_products(
                &self,
                filter: &crate::domain::ProductFilter,
            ) -> crate::interfaces::Result<Vec<crate::domain::Product>> {
                use sea_query::{Expr, Func, LikeExpr, Order, Query};

                use super::query::{escape_like, LIKE_ESCAPE};
                use crate::domain::ActiveFilter;

                let sql = {
                    let mut stmt = Query::select();
                    stmt.columns(PRODUCT_COLUMNS).from(Products::Table);

                    match filter.active {
                        ActiveFilter::Active => {
                            stmt.and_where(Expr::col(Products::IsActive).eq(true));
                        }
                        ActiveFilter::Inactive => {
                            stmt.and_where(Expr::col(Products::IsActive).eq(false));
                        }
                        ActiveFilter::All => {}
                    }
                    if let Some(category) = &filter.category {
                        stmt.and_where(Expr::col(Products::Category).eq(category.as_str()));
                    }
                    if let Some(min) = filter.min_price {
                        stmt.and_where(Expr::col(Products::Price).gte(min.minor_units()));
                    }
                    if let Some(max) = filter.max_price {
                        stmt.and_where(Expr::col(Products::Price).lte(max.minor_units()));
                    }
                    if let Some(search) = &filter.search {
                        // Literal substring match: wildcards in the search are escaped.
                        let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
                        stmt.and_where(
                            Expr::expr(Func::lower(Expr::col(Products::Name)))
                                .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)),
                        );
                    }
                    stmt.order_by(Products::Name, Order::Asc);
                    <$db_type>::build_select(stmt)
                };
                let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
                rows.iter().map(Self::product_from_row).collect()
            }

            async fn count_products(&self) -> crate::interfaces::Result<i64> {
                use sea_query::{Alias, Asterisk, Expr, Query};
                use sqlx::Row;

                let sql = <$db_type>::build_select(
                    Query::select()
                        .expr_as(Expr::col(Asterisk).count(), Alias::new("count"))
                        .from(Products::Table)
                        .to_owned(),
                );
                let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
                Ok(row.try_get::<i64, _>("count")?)
            }
        }
    };
}

// Generate implementations for each SQL backend
impl_catalog_store!(super::postgres::Postgres, "postgres");
impl_catalog_store!(super::sqlite::Sqlite, "sqlite");
