//! Unified SQL OrderStore implementation.
//!
//! An order is a header row in `orders` plus one row per line in
//! `order_items`, keyed by submission position. Inserts and deletes touch
//! both tables inside a single transaction.

use std::collections::HashMap;
use std::marker::PhantomData;

use uuid::Uuid;

use super::SqlDatabase;
use crate::domain::{Order, OrderLine};
use crate::storage::schema::{OrderItems, Orders};

const ORDER_COLUMNS: [Orders; 7] = [
    Orders::Id,
    Orders::CustomerId,
    Orders::Status,
    Orders::Total,
    Orders::Note,
    Orders::CreatedAt,
    Orders::UpdatedAt,
];

const ITEM_COLUMNS: [OrderItems; 8] = [
    OrderItems::Id,
    OrderItems::OrderId,
    OrderItems::Position,
    OrderItems::ProductId,
    OrderItems::ProductNameSnapshot,
    OrderItems::UnitPriceSnapshot,
    OrderItems::Quantity,
    OrderItems::LineAmount,
];

/// SQL-based implementation of OrderStore.
pub struct SqlOrderStore<DB: SqlDatabase> {
    pool: DB::Pool,
    _marker: PhantomData<DB>,
}

impl<DB: SqlDatabase> SqlOrderStore<DB> {
    pub fn new(pool: DB::Pool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }
}

/// Attach lines (already sorted by position) to their headers.
fn assemble(headers: Vec<Order>, lines: Vec<OrderLine>) -> Vec<Order> {
    let mut by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
    for line in lines {
        by_order.entry(line.order_id).or_default().push(line);
    }
    headers
        .into_iter()
        .map(|mut order| {
            order.lines = by_order.remove(&order.id).unwrap_or_default();
            order
        })
        .collect()
}

/// Macro to implement OrderStore for a specific SQL backend.
macro_rules! impl_order_store {
    ($db_type:ty, $feature:literal) => {
        #[cfg(feature = $feature)]
        impl SqlOrderStore<$db_type> {
            fn header_from_row(
                row: &<$db_type as SqlDatabase>::Row,
            ) -> crate::interfaces::Result<Order> {
                use sqlx::Row;

                use super::query::{parse_status, parse_timestamp, parse_uuid};

                Ok(Order {
                    id: parse_uuid(&row.try_get::<String, _>("id")?)?,
                    customer_id: parse_uuid(&row.try_get::<String, _>("customer_id")?)?,
                    lines: Vec::new(),
                    status: parse_status(&row.try_get::<String, _>("status")?)?,
                    total: crate::domain::Money::from_minor(row.try_get::<i64, _>("total")?),
                    note: row.try_get("note")?,
                    created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
                    updated_at: parse_timestamp(&row.try_get::<String, _>("updated_at")?)?,
                })
            }

            fn line_from_row(
                row: &<$db_type as SqlDatabase>::Row,
            ) -> crate::interfaces::Result<OrderLine> {
                use sqlx::Row;

                use super::query::parse_uuid;
                use crate::domain::Money;

                Ok(OrderLine {
                    id: parse_uuid(&row.try_get::<String, _>("id")?)?,
                    order_id: parse_uuid(&row.try_get::<String, _>("order_id")?)?,
                    product_id: parse_uuid(&row.try_get::<String, _>("product_id")?)?,
                    product_name: row.try_get("product_name_snapshot")?,
                    unit_price: Money::from_minor(row.try_get::<i64, _>("unit_price_snapshot")?),
                    quantity: row.try_get::<i64, _>("quantity")?,
                    line_amount: Money::from_minor(row.try_get::<i64, _>("line_amount")?),
                })
            }

            /// Run a rendered header query and load the lines of every order
            /// it returns. Both reads share one transaction, so headers and
            /// lines come from the same snapshot.
            async fn load_orders(&self, header_sql: String) -> crate::interfaces::Result<Vec<Order>> {
                let mut tx = self.pool.begin().await?;

                let rows = sqlx::query(&header_sql).fetch_all(&mut *tx).await?;
                let headers = rows
                    .iter()
                    .map(Self::header_from_row)
                    .collect::<crate::interfaces::Result<Vec<_>>>()?;
                if headers.is_empty() {
                    tx.commit().await?;
                    return Ok(headers);
                }

                let items_sql = {
                    use sea_query::{Expr, Order as SortOrder, Query};

                    let ids: Vec<String> = headers.iter().map(|o| o.id.to_string()).collect();
                    let stmt = Query::select()
                        .columns(ITEM_COLUMNS)
                        .from(OrderItems::Table)
                        .and_where(Expr::col(OrderItems::OrderId).is_in(ids))
                        .order_by(OrderItems::OrderId, SortOrder::Asc)
                        .order_by(OrderItems::Position, SortOrder::Asc)
                        .to_owned();
                    <$db_type>::build_select(stmt)
                };
                let rows = sqlx::query(&items_sql).fetch_all(&mut *tx).await?;
                let lines = rows
                    .iter()
                    .map(Self::line_from_row)
                    .collect::<crate::interfaces::Result<Vec<_>>>()?;
                tx.commit().await?;

                Ok(assemble(headers, lines))
            }
        }

        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::interfaces::OrderStore for SqlOrderStore<$db_type> {
            async fn insert_order(&self, order: &Order) -> crate::interfaces::Result<()> {
                use sea_query::Query;

                use crate::storage::schema::timestamp;

                // Statements are not Send; render everything before the first await.
                let header_sql = {
                    let stmt = Query::insert()
                        .into_table(Orders::Table)
                        .columns(ORDER_COLUMNS)
                        .values_panic([
                            order.id.to_string().into(),
                            order.customer_id.to_string().into(),
                            order.status.as_str().into(),
                            order.total.minor_units().into(),
                            order.note.clone().into(),
                            timestamp(order.created_at).into(),
                            timestamp(order.updated_at).into(),
                        ])
                        .to_owned();
                    <$db_type>::build_insert(stmt)
                };
                let item_sqls: Vec<String> = order
                    .lines
                    .iter()
                    .enumerate()
                    .map(|(position, line)| {
                        let stmt = Query::insert()
                            .into_table(OrderItems::Table)
                            .columns(ITEM_COLUMNS)
                            .values_panic([
                                line.id.to_string().into(),
                                order.id.to_string().into(),
                                (position as i64).into(),
                                line.product_id.to_string().into(),
                                line.product_name.clone().into(),
                                line.unit_price.minor_units().into(),
                                line.quantity.into(),
                                line.line_amount.minor_units().into(),
                            ])
                            .to_owned();
                        <$db_type>::build_insert(stmt)
                    })
                    .collect();

                let mut tx = self.pool.begin().await?;
                sqlx::query(&header_sql).execute(&mut *tx).await?;
                for item_sql in &item_sqls {
                    sqlx::query(item_sql).execute(&mut *tx).await?;
                }

                tx.commit().await?;
                Ok(())
            }

            async fn get_order(&self, id: Uuid) -> crate::interfaces::Result<Option<Order>> {
                use sea_query::{Expr, Query};

                let sql = <$db_type>::build_select(
                    Query::select()
                        .columns(ORDER_COLUMNS)
                        .from(Orders::Table)
                        .and_where(Expr::col(Orders::Id).eq(id.to_string()))
                        .to_owned(),
                );
                Ok(self.load_orders(sql).await?.into_iter().next())
            }

            async fn orders_for_customer(
                &self,
                customer_id: Uuid,
            ) -> crate::interfaces::Result<Vec<Order>> {
                use sea_query::{Expr, Order as SortOrder, Query};

                let sql = <$db_type>::build_select(
                    Query::select()
                        .columns(ORDER_COLUMNS)
                        .from(Orders::Table)
                        .and_where(Expr::col(Orders::CustomerId).eq(customer_id.to_string()))
                        .order_by(Orders::CreatedAt, SortOrder::Desc)
                        .to_owned(),
                );
                self.load_orders(sql).await
            }

            async fn orders_with_status(
                &self,
                status: crate::domain::OrderStatus,
            ) -> crate::interfaces::Result<Vec<Order>> {
                use sea_query::{Expr, Order as SortOrder, Query};

                let sql = <$db_type>::build_select(
                    Query::select()
                        .columns(ORDER_COLUMNS)
                        .from(Orders::Table)
                        .and_where(Expr::col(Orders::Status).eq(status.as_str()))
                        .order_by(Orders::CreatedAt, SortOrder::Desc)
                        .to_owned(),
                );
                self.load_orders(sql).await
            }

            async fn orders_created_between(
                &self,
                start: chrono::DateTime<chrono::Utc>,
                end: chrono::DateTime<chrono::Utc>,
            ) -> crate::interfaces::Result<Vec<Order>> {
                use sea_query::{Expr, Order as SortOrder, Query};

                use crate::storage::schema::timestamp;

                let sql = <$db_type>::build_select(
                    Query::select()
                        .columns(ORDER_COLUMNS)
                        .from(Orders::Table)
                        .and_where(Expr::col(Orders::CreatedAt).gte(timestamp(start)))
                        .and_where(Expr::col(Orders::CreatedAt).lt(timestamp(end)))
                        .order_by(Orders::CreatedAt, SortOrder::Desc)
                        .to_owned(),
                );
                self.load_orders(sql).await
            }

            async fn count_orders(&self) -> crate::interfaces::Result<i64> {
                use sea_query::{Alias, Asterisk, Expr, Query};
                use sqlx::Row;

                let sql = <$db_type>::build_select(
                    Query::select()
                        .expr_as(Expr::col(Asterisk).count(), Alias::new("count"))
                        .from(Orders::Table)
                        .to_owned(),
                );
                let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
                Ok(row.try_get::<i64, _>("count")?)
            }

            async fn update_status_if(
                &self,
                id: Uuid,
                expected: crate::domain::OrderStatus,
                to: crate::domain::OrderStatus,
                updated_at: chrono::DateTime<chrono::Utc>,
            ) -> crate::interfaces::Result<bool> {
                use sea_query::{Expr, Query};

                use crate::storage::schema::timestamp;

                let sql = <$db_type>::build_update(
                    Query::update()
                        .table(Orders::Table)
                        .values([
                            (Orders::Status, to.as_str().into()),
                            (Orders::UpdatedAt, timestamp(updated_at).into()),
                        ])
                        .and_where(Expr::col(Orders::Id).eq(id.to_string()))
                        .and_where(Expr::col(Orders::Status).eq(expected.as_str()))
                        .to_owned(),
                );
                let result = sqlx::query(&sql).execute(&self.pool).await?;
                Ok(result.rows_affected() == 1)
            }

            async fn delete_order(&self, id: Uuid) -> crate::interfaces::Result<bool> {
                use sea_query::{Expr, Query};

                let items_sql = <$db_type>::build_delete(
                    Query::delete()
                        .from_table(OrderItems::Table)
                        .and_where(Expr::col(OrderItems::OrderId).eq(id.to_string()))
                        .to_owned(),
                );
                let header_sql = <$db_type>::build_delete(
                    Query::delete()
                        .from_table(Orders::Table)
                        .and_where(Expr::col(Orders::Id).eq(id.to_string()))
                        .to_owned(),
                );

                let mut tx = self.pool.begin().await?;
                sqlx::query(&items_sql).execute(&mut *tx).await?;
                let result = sqlx::query(&header_sql).execute(&mut *tx).await?;
                tx.commit().await?;

                Ok(result.rows_affected() > 0)
            }
        }
    };
}

// Generate implementations for each SQL backend
impl_order_store!(super::postgres::Postgres, "postgres");
impl_order_store!(super::sqlite::Sqlite, "sqlite");
