//! Persists an order draft as one atomic unit.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use uuid::Uuid;

use super::error::{OrderError, Result};
use crate::domain::{now, Order, OrderDraft};
use crate::interfaces::{OrderStore, StorageError};
use crate::utils::deadline::within;

pub struct OrderCommitter {
    store: Arc<dyn OrderStore>,
    deadline: Duration,
}

impl OrderCommitter {
    pub fn new(store: Arc<dyn OrderStore>, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    /// Assign identity and timestamps, then write header and lines in one
    /// transaction. On failure nothing of the order is visible.
    ///
    /// Running out of time is a commit failure like any other: the dropped
    /// insert rolls its transaction back.
    pub async fn commit(&self, draft: OrderDraft) -> Result<Order> {
        let order = draft.into_order(Uuid::new_v4(), now());

        let written = within(self.deadline, "insert_order", self.store.insert_order(&order))
            .await
            .map_err(StorageError::from)
            .and_then(|inserted| inserted);

        match written {
            Ok(()) => {
                info!(
                    order_id = %order.id,
                    customer_id = %order.customer_id,
                    lines = order.lines.len(),
                    total = %order.total,
                    "Order committed"
                );
                Ok(order)
            }
            Err(source) => {
                error!(order_id = %order.id, error = %source, "Order commit failed");
                Err(OrderError::CommitFailed {
                    order_id: order.id,
                    source,
                })
            }
        }
    }
}
