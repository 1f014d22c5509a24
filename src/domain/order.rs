//! Orders, order lines and the order status lifecycle.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Money, Product};

/// Order status.
///
/// ```text
/// pending -> confirmed -> preparing -> ready -> completed
///    \           \            \          \
///     +-----------+------------+----------+--> cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// No transition leaves a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether `self -> next` is an edge of the lifecycle.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Pending, Confirmed) | (Confirmed, Preparing) | (Preparing, Ready) | (Ready, Completed) => {
                true
            }
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A client-submitted (product, quantity) pair. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CartLine {
    pub product_id: Uuid,
    pub quantity: i64,
}

/// A priced line of an order draft.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub line_amount: Money,
}

impl DraftLine {
    /// Prices `quantity` units of `product` at its current price.
    ///
    /// Returns `None` if the line amount overflows.
    pub fn price(product: &Product, quantity: i64) -> Option<Self> {
        Some(Self {
            product_id: product.id,
            product_name: product.name.clone(),
            unit_price: product.price,
            quantity,
            line_amount: product.price.checked_mul(quantity)?,
        })
    }
}

/// A priced, not yet persisted order.
///
/// The total is computed here from the lines and cannot be supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    customer_id: Uuid,
    lines: Vec<DraftLine>,
    total: Money,
    note: Option<String>,
}

impl OrderDraft {
    /// Returns `None` if the total overflows.
    pub fn new(customer_id: Uuid, lines: Vec<DraftLine>, note: Option<String>) -> Option<Self> {
        let total = lines
            .iter()
            .try_fold(Money::ZERO, |acc, line| acc.checked_add(line.line_amount))?;
        Some(Self {
            customer_id,
            lines,
            total,
            note,
        })
    }

    pub fn customer_id(&self) -> Uuid {
        self.customer_id
    }

    pub fn lines(&self) -> &[DraftLine] {
        &self.lines
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn status(&self) -> OrderStatus {
        OrderStatus::Pending
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Gives the draft and each of its lines an identity.
    pub fn into_order(self, order_id: Uuid, created_at: DateTime<Utc>) -> Order {
        let lines = self
            .lines
            .into_iter()
            .map(|line| OrderLine {
                id: Uuid::new_v4(),
                order_id,
                product_id: line.product_id,
                product_name: line.product_name,
                unit_price: line.unit_price,
                quantity: line.quantity,
                line_amount: line.line_amount,
            })
            .collect();

        Order {
            id: order_id,
            customer_id: self.customer_id,
            lines,
            status: OrderStatus::Pending,
            total: self.total,
            note: self.note,
            created_at,
            updated_at: created_at,
        }
    }
}

/// A persisted order line with its product snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub line_amount: Money,
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    /// In submission order.
    pub lines: Vec<OrderLine>,
    pub status: OrderStatus,
    pub total: Money,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// `Σ unit_price × quantity`, or `None` on overflow.
    pub fn lines_total(&self) -> Option<Money> {
        self.lines.iter().try_fold(Money::ZERO, |acc, line| {
            acc.checked_add(line.unit_price.checked_mul(line.quantity)?)
        })
    }

    /// The stored total agrees with the lines.
    pub fn is_consistent(&self) -> bool {
        self.lines_total() == Some(self.total)
            && self
                .lines
                .iter()
                .all(|line| line.unit_price.checked_mul(line.quantity) == Some(line.line_amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, price: i64) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category: "coffee".to_string(),
            description: String::new(),
            image_url: String::new(),
            price: Money::from_minor(price),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_lifecycle_edges() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Preparing));
        assert!(Preparing.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Ready));
        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn test_cancel_from_any_non_terminal_state() {
        use OrderStatus::*;
        for from in [Pending, Confirmed, Preparing, Ready] {
            assert!(from.can_transition_to(Cancelled), "{from} -> cancelled");
        }
    }

    #[test]
    fn test_terminal_states_accept_nothing() {
        for from in [OrderStatus::Completed, OrderStatus::Cancelled] {
            for to in OrderStatus::ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_status_parse_roundtrip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_draft_total_is_sum_of_lines() {
        let a = product("Americano", 350);
        let b = product("Croissant", 500);
        let lines = vec![
            DraftLine::price(&a, 2).unwrap(),
            DraftLine::price(&b, 1).unwrap(),
        ];
        let draft = OrderDraft::new(Uuid::new_v4(), lines, None).unwrap();
        assert_eq!(draft.total(), Money::from_minor(1200));
        assert_eq!(draft.status(), OrderStatus::Pending);

        let order = draft.into_order(Uuid::new_v4(), Utc::now());
        assert!(order.is_consistent());
        assert!(order.lines.iter().all(|l| l.order_id == order.id));
    }

    #[test]
    fn test_draft_total_overflow() {
        let pricey = product("Gold Leaf", i64::MAX / 2 + 1);
        let line = DraftLine::price(&pricey, 1).unwrap();
        assert!(OrderDraft::new(Uuid::new_v4(), vec![line.clone(), line], None).is_none());
        assert!(DraftLine::price(&pricey, 2).is_none());
    }
}
