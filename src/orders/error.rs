//! Order errors.

use uuid::Uuid;

use crate::domain::OrderStatus;
use crate::interfaces::StorageError;
use crate::utils::deadline::DeadlineExceeded;

pub type Result<T> = std::result::Result<T, OrderError>;

/// Errors from building, committing, querying or transitioning orders.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: Uuid, quantity: i64 },

    #[error("unknown product {product_id}")]
    UnknownProduct { product_id: Uuid },

    #[error("product {product_id} is not available")]
    ProductUnavailable { product_id: Uuid },

    #[error("unknown customer {customer_id}")]
    UnknownCustomer { customer_id: Uuid },

    #[error("order amount overflows")]
    AmountOverflow,

    #[error("order {order_id} not found")]
    NotFound { order_id: Uuid },

    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("failed to commit order {order_id}")]
    CommitFailed {
        order_id: Uuid,
        #[source]
        source: StorageError,
    },

    #[error("{operation} failed for {target}")]
    Storage {
        operation: &'static str,
        target: String,
        #[source]
        source: StorageError,
    },

    #[error(transparent)]
    Deadline(#[from] DeadlineExceeded),
}

impl OrderError {
    pub(crate) fn storage(operation: &'static str, target: impl ToString, source: StorageError) -> Self {
        OrderError::Storage {
            operation,
            target: target.to_string(),
            source,
        }
    }

    /// Rejected input; retrying the same request cannot succeed.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            OrderError::EmptyCart
                | OrderError::InvalidQuantity { .. }
                | OrderError::UnknownProduct { .. }
                | OrderError::ProductUnavailable { .. }
                | OrderError::UnknownCustomer { .. }
                | OrderError::AmountOverflow
        )
    }
}
