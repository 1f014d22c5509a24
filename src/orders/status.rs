//! Order status changes.
//!
//! Every change is a conditional update on the expected prior status, so two
//! callers racing from the same state cannot both win.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use super::error::{OrderError, Result};
use crate::domain::{now, Order, OrderStatus};
use crate::interfaces::OrderStore;
use crate::utils::deadline::within;

pub struct StatusAuthority {
    store: Arc<dyn OrderStore>,
    deadline: Duration,
}

impl StatusAuthority {
    pub fn new(store: Arc<dyn OrderStore>, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    /// Move order `id` to `to`.
    ///
    /// With `expected` the update only applies while the order is still in
    /// that state; without it the current state is read first. A transition
    /// outside the lifecycle, or one whose expected state is stale, fails with
    /// `InvalidTransition` and writes nothing.
    pub async fn transition(
        &self,
        id: Uuid,
        to: OrderStatus,
        expected: Option<OrderStatus>,
    ) -> Result<Order> {
        let from = match expected {
            Some(status) => status,
            None => self.load(id).await?.status,
        };
        if !from.can_transition_to(to) {
            return Err(OrderError::InvalidTransition { from, to });
        }

        let updated = within(
            self.deadline,
            "update_status",
            self.store.update_status_if(id, from, to, now()),
        )
        .await?
        .map_err(|e| OrderError::storage("update_status", id, e))?;

        if !updated {
            // Absent, or someone else moved it first.
            let current = self.find(id).await?;
            return match current {
                None => Err(OrderError::NotFound { order_id: id }),
                Some(order) => {
                    warn!(order_id = %id, expected = %from, actual = %order.status, "Stale status transition");
                    Err(OrderError::InvalidTransition { from, to })
                }
            };
        }

        info!(order_id = %id, from = %from, to = %to, "Order status changed");
        self.load(id).await
    }

    async fn find(&self, id: Uuid) -> Result<Option<Order>> {
        within(self.deadline, "get_order", self.store.get_order(id))
            .await?
            .map_err(|e| OrderError::storage("get_order", id, e))
    }

    async fn load(&self, id: Uuid) -> Result<Order> {
        self.find(id)
            .await?
            .ok_or(OrderError::NotFound { order_id: id })
    }
}
