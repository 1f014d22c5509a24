//! Turns a cart into a priced order draft.
//!
//! The builder only reads: it validates the cart, resolves every product at
//! its current catalog price and hands back an `OrderDraft` whose total is
//! computed from its lines.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use super::error::{OrderError, Result};
use crate::domain::{CartLine, DraftLine, OrderDraft};
use crate::interfaces::{CatalogStore, UserStore};
use crate::utils::deadline::within;

pub struct OrderBuilder {
    catalog: Arc<dyn CatalogStore>,
    users: Arc<dyn UserStore>,
    deadline: Duration,
}

impl OrderBuilder {
    pub fn new(catalog: Arc<dyn CatalogStore>, users: Arc<dyn UserStore>, deadline: Duration) -> Self {
        Self {
            catalog,
            users,
            deadline,
        }
    }

    /// Validate `cart` and price it for `customer_id`.
    ///
    /// Checks run in this order and the first failure wins:
    /// 1. the cart has at least one line
    /// 2. every quantity is at least 1 (before any storage call)
    /// 3. the customer exists
    /// 4. each product, in cart order, exists and is active
    /// 5. line amounts and the total fit in `Money`
    pub async fn build(
        &self,
        customer_id: Uuid,
        cart: &[CartLine],
        note: Option<String>,
    ) -> Result<OrderDraft> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        if let Some(line) = cart.iter().find(|line| line.quantity < 1) {
            return Err(OrderError::InvalidQuantity {
                product_id: line.product_id,
                quantity: line.quantity,
            });
        }

        let customer = within(self.deadline, "get_user", self.users.get_user(customer_id))
            .await?
            .map_err(|e| OrderError::storage("get_user", customer_id, e))?;
        if customer.is_none() {
            return Err(OrderError::UnknownCustomer { customer_id });
        }

        let mut lines = Vec::with_capacity(cart.len());
        for item in cart {
            let product = within(
                self.deadline,
                "get_product",
                self.catalog.get_product(item.product_id),
            )
            .await?
            .map_err(|e| OrderError::storage("get_product", item.product_id, e))?
            .ok_or(OrderError::UnknownProduct {
                product_id: item.product_id,
            })?;

            if !product.is_active {
                return Err(OrderError::ProductUnavailable {
                    product_id: product.id,
                });
            }

            let line = DraftLine::price(&product, item.quantity).ok_or(OrderError::AmountOverflow)?;
            debug!(product_id = %product.id, quantity = item.quantity, amount = %line.line_amount, "Priced line");
            lines.push(line);
        }

        let note = note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        OrderDraft::new(customer_id, lines, note).ok_or(OrderError::AmountOverflow)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{Money, OrderStatus, Product, Role, User};
    use crate::storage::{MockCatalogStore, MockUserStore};

    struct Fixture {
        catalog: Arc<MockCatalogStore>,
        builder: OrderBuilder,
        customer: Uuid,
    }

    async fn fixture() -> Fixture {
        let catalog = Arc::new(MockCatalogStore::new());
        let users = Arc::new(MockUserStore::new());
        let now = Utc::now();
        let customer = User {
            id: Uuid::new_v4(),
            name: "Jo".to_string(),
            surname: "Doe".to_string(),
            email: "jo@example.com".to_string(),
            password_hash: String::new(),
            role: Role::Client,
            created_at: now,
            updated_at: now,
        };
        users.insert_user(&customer).await.unwrap();
        let builder = OrderBuilder::new(catalog.clone(), users.clone(), Duration::from_secs(1));
        Fixture {
            catalog,
            builder,
            customer: customer.id,
        }
    }

    async fn add_product(catalog: &MockCatalogStore, name: &str, price: i64, active: bool) -> Uuid {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category: "coffee".to_string(),
            description: String::new(),
            image_url: String::new(),
            price: Money::from_minor(price),
            is_active: active,
            created_at: now,
            updated_at: now,
        };
        catalog.insert_product(&product).await.unwrap();
        product.id
    }

    fn cart(items: &[(Uuid, i64)]) -> Vec<CartLine> {
        items
            .iter()
            .map(|&(product_id, quantity)| CartLine {
                product_id,
                quantity,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_build_prices_from_catalog() {
        let f = fixture().await;
        let a = add_product(&f.catalog, "Americano", 350, true).await;
        let b = add_product(&f.catalog, "Croissant", 500, true).await;

        let draft = f
            .builder
            .build(f.customer, &cart(&[(a, 2), (b, 1)]), None)
            .await
            .unwrap();

        assert_eq!(draft.total(), Money::from_minor(1200));
        assert_eq!(draft.status(), OrderStatus::Pending);
        let prices: Vec<i64> = draft.lines().iter().map(|l| l.unit_price.minor_units()).collect();
        assert_eq!(prices, vec![350, 500]);
    }

    #[tokio::test]
    async fn test_empty_cart() {
        let f = fixture().await;
        let err = f.builder.build(f.customer, &[], None).await.unwrap_err();
        assert!(matches!(err, OrderError::EmptyCart));
    }

    #[tokio::test]
    async fn test_invalid_quantity_checked_before_storage() {
        let f = fixture().await;
        let a = add_product(&f.catalog, "Americano", 350, true).await;
        let missing = Uuid::new_v4();

        let err = f
            .builder
            .build(f.customer, &cart(&[(missing, 1), (a, 0)]), None)
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::InvalidQuantity { product_id, quantity: 0 } if product_id == a));
        assert_eq!(f.catalog.lookups(), 0);
    }

    #[tokio::test]
    async fn test_negative_quantity() {
        let f = fixture().await;
        let a = add_product(&f.catalog, "Americano", 350, true).await;
        let err = f
            .builder
            .build(f.customer, &cart(&[(a, -3)]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidQuantity { quantity: -3, .. }));
    }

    #[tokio::test]
    async fn test_unknown_product_stops_resolution() {
        let f = fixture().await;
        let a = add_product(&f.catalog, "Americano", 350, true).await;
        let missing = Uuid::new_v4();

        let err = f
            .builder
            .build(f.customer, &cart(&[(missing, 1), (a, 1)]), None)
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::UnknownProduct { product_id } if product_id == missing));
        assert_eq!(f.catalog.lookups(), 1);
    }

    #[tokio::test]
    async fn test_inactive_product_is_unavailable() {
        let f = fixture().await;
        let retired = add_product(&f.catalog, "Pumpkin Spice", 550, false).await;
        let err = f
            .builder
            .build(f.customer, &cart(&[(retired, 1)]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::ProductUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_unknown_customer() {
        let f = fixture().await;
        let a = add_product(&f.catalog, "Americano", 350, true).await;
        let stranger = Uuid::new_v4();
        let err = f
            .builder
            .build(stranger, &cart(&[(a, 1)]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::UnknownCustomer { customer_id } if customer_id == stranger));
    }

    #[tokio::test]
    async fn test_overflow_is_rejected() {
        let f = fixture().await;
        let gold = add_product(&f.catalog, "Gold Leaf Latte", i64::MAX / 2, true).await;
        let err = f
            .builder
            .build(f.customer, &cart(&[(gold, 3)]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::AmountOverflow));
    }

    #[tokio::test]
    async fn test_catalog_failure_is_storage_error() {
        let f = fixture().await;
        let a = add_product(&f.catalog, "Americano", 350, true).await;
        f.catalog.set_fail_on_get(true).await;
        let err = f
            .builder
            .build(f.customer, &cart(&[(a, 1)]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Storage { operation: "get_product", .. }));
        assert!(!err.is_validation());
    }

    #[tokio::test]
    async fn test_blank_note_is_dropped() {
        let f = fixture().await;
        let a = add_product(&f.catalog, "Americano", 350, true).await;
        let draft = f
            .builder
            .build(f.customer, &cart(&[(a, 1)]), Some("   ".to_string()))
            .await
            .unwrap();
        assert!(draft.note().is_none());
    }
}
