//! Order placement, queries and status changes.
//!
//! ```text
//! cart -> OrderBuilder (reads catalog) -> OrderDraft
//!      -> OrderCommitter (one transaction) -> Order
//! ```

mod builder;
mod committer;
mod error;
mod status;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveTime, TimeDelta, Utc};
use tracing::{info, instrument};
use uuid::Uuid;

pub use builder::OrderBuilder;
pub use committer::OrderCommitter;
pub use error::{OrderError, Result};
pub use status::StatusAuthority;

use crate::domain::{CartLine, Order, OrderStatus};
use crate::interfaces::OrderStore;
use crate::storage::Stores;
use crate::utils::deadline::within;

/// `[start, end)` in UTC of the calendar day containing `at`, where days
/// begin at midnight in `offset`.
pub fn day_bounds(at: DateTime<Utc>, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let local_midnight = at.with_timezone(&offset).date_naive().and_time(NaiveTime::MIN);
    let start_naive = local_midnight - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
    let start = DateTime::<Utc>::from_naive_utc_and_offset(start_naive, Utc);
    (start, start + TimeDelta::days(1))
}

/// Entry point for everything order related.
pub struct OrderService {
    builder: OrderBuilder,
    committer: OrderCommitter,
    status: StatusAuthority,
    store: Arc<dyn OrderStore>,
    deadline: Duration,
    day_offset: FixedOffset,
}

impl OrderService {
    /// `deadline` bounds each storage call; `day_offset` defines "today".
    pub fn new(stores: &Stores, deadline: Duration, day_offset: FixedOffset) -> Self {
        Self {
            builder: OrderBuilder::new(stores.catalog.clone(), stores.users.clone(), deadline),
            committer: OrderCommitter::new(stores.orders.clone(), deadline),
            status: StatusAuthority::new(stores.orders.clone(), deadline),
            store: stores.orders.clone(),
            deadline,
            day_offset,
        }
    }

    /// Build a priced draft from `cart` and commit it.
    #[instrument(skip(self, cart, note), fields(lines = cart.len()))]
    pub async fn place_order(
        &self,
        customer_id: Uuid,
        cart: &[CartLine],
        note: Option<String>,
    ) -> Result<Order> {
        let draft = self.builder.build(customer_id, cart, note).await?;
        self.committer.commit(draft).await
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, id: Uuid) -> Result<Order> {
        within(self.deadline, "get_order", self.store.get_order(id))
            .await?
            .map_err(|e| OrderError::storage("get_order", id, e))?
            .ok_or(OrderError::NotFound { order_id: id })
    }

    /// Newest first; empty if the customer has no orders.
    #[instrument(skip(self))]
    pub async fn orders_for_customer(&self, customer_id: Uuid) -> Result<Vec<Order>> {
        within(
            self.deadline,
            "orders_for_customer",
            self.store.orders_for_customer(customer_id),
        )
        .await?
        .map_err(|e| OrderError::storage("orders_for_customer", customer_id, e))
    }

    #[instrument(skip(self))]
    pub async fn orders_with_status(&self, status: OrderStatus) -> Result<Vec<Order>> {
        within(
            self.deadline,
            "orders_with_status",
            self.store.orders_with_status(status),
        )
        .await?
        .map_err(|e| OrderError::storage("orders_with_status", status, e))
    }

    /// Orders created during the current calendar day.
    #[instrument(skip(self))]
    pub async fn orders_today(&self) -> Result<Vec<Order>> {
        let (start, end) = day_bounds(Utc::now(), self.day_offset);
        within(
            self.deadline,
            "orders_today",
            self.store.orders_created_between(start, end),
        )
        .await?
        .map_err(|e| OrderError::storage("orders_today", start.date_naive(), e))
    }

    #[instrument(skip(self))]
    pub async fn count_orders(&self) -> Result<i64> {
        within(self.deadline, "count_orders", self.store.count_orders())
            .await?
            .map_err(|e| OrderError::storage("count_orders", "orders", e))
    }

    /// See [`StatusAuthority::transition`].
    #[instrument(skip(self))]
    pub async fn transition(
        &self,
        id: Uuid,
        to: OrderStatus,
        expected: Option<OrderStatus>,
    ) -> Result<Order> {
        self.status.transition(id, to, expected).await
    }

    /// Remove an order and its lines.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: Uuid) -> Result<()> {
        let deleted = within(self.deadline, "delete_order", self.store.delete_order(id))
            .await?
            .map_err(|e| OrderError::storage("delete_order", id, e))?;
        if !deleted {
            return Err(OrderError::NotFound { order_id: id });
        }
        info!(order_id = %id, "Order deleted");
        Ok(())
    }
}
