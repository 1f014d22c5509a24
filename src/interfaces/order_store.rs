//! Order storage interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Result;
use crate::domain::{Order, OrderStatus};

/// Interface for order persistence.
///
/// An order and its lines are one unit: `insert_order` writes both or
/// neither, and every read returns the order with its lines in submission
/// order.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Write the header, then each line, inside one transaction.
    async fn insert_order(&self, order: &Order) -> Result<()>;

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>>;

    /// Newest first.
    async fn orders_for_customer(&self, customer_id: Uuid) -> Result<Vec<Order>>;

    /// Newest first.
    async fn orders_with_status(&self, status: OrderStatus) -> Result<Vec<Order>>;

    /// Orders with `start <= created_at < end`, newest first.
    async fn orders_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Order>>;

    async fn count_orders(&self) -> Result<i64>;

    /// Set `status = to` only where the row still has status `expected`.
    ///
    /// Returns whether a row was updated. Zero rows means the order is
    /// absent or its status moved on.
    async fn update_status_if(
        &self,
        id: Uuid,
        expected: OrderStatus,
        to: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Delete an order with its lines. Returns false if the order is absent.
    async fn delete_order(&self, id: Uuid) -> Result<bool>;
}
