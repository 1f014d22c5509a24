//! Mock storage implementations for testing.
//!
//! Every mock keeps its rows in memory and can be told to fail, so services
//! can be exercised against storage errors without a database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Order, OrderStatus, Product, ProductFilter, Role, User};
use crate::interfaces::{CatalogStore, OrderStore, Result, StorageError, UserStore};


fn injected(operation: &str) -> StorageError {
    StorageError::Connection(format!("Mock {operation} failure"))
}

/// Mock catalog store that keeps products in memory.
#[derive(Default)]
pub struct MockCatalogStore {
    products: RwLock<HashMap<Uuid, Product>>,
    fail_on_get: RwLock<bool>,
    lookups: AtomicUsize,
}

impl MockCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_get(&self, fail: bool) {
        *self.fail_on_get.write().await = fail;
    }

    /// Number of `get_product` calls so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogStore for MockCatalogStore {
    async fn insert_product(&self, product: &Product) -> Result<()> {
        self.products
            .write()
            .await
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if *self.fail_on_get.read().await {
            return Err(injected("get_product"));
        }
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn update_product(&self, product: &Product) -> Result<bool> {
        let mut products = self.products.write().await;
        match products.get_mut(&product.id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool> {
        Ok(self.products.write().await.remove(&id).is_some())
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let products = self.products.read().await;
        let mut matching: Vec<Product> = products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matching)
    }

    async fn count_products(&self) -> Result<i64> {
        Ok(self.products.read().await.len() as i64)
    }
}

/// Mock order store that keeps orders in memory.
#[derive(Default)]
pub struct MockOrderStore {
    orders: RwLock<HashMap<Uuid, Order>>,
    fail_on_insert: RwLock<bool>,
    fail_on_get: RwLock<bool>,
    inserts: AtomicUsize,
}

impl MockOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_insert(&self, fail: bool) {
        *self.fail_on_insert.write().await = fail;
    }

    pub async fn set_fail_on_get(&self, fail: bool) {
        *self.fail_on_get.write().await = fail;
    }

    /// Number of `insert_order` calls so far, including failed ones.
    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }

    async fn select(&self, predicate: impl Fn(&Order) -> bool) -> Result<Vec<Order>> {
        if *self.fail_on_get.read().await {
            return Err(injected("get_order"));
        }
        let orders = self.orders.read().await;
        let mut matching: Vec<Order> = orders.values().filter(|o| predicate(o)).cloned().collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }
}

#[async_trait]
impl OrderStore for MockOrderStore {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if *self.fail_on_insert.read().await {
            return Err(injected("insert_order"));
        }
        self.orders.write().await.insert(order.id, order.clone());
        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>> {
        Ok(self.select(|o| o.id == id).await?.into_iter().next())
    }

    async fn orders_for_customer(&self, customer_id: Uuid) -> Result<Vec<Order>> {
        self.select(|o| o.customer_id == customer_id).await
    }

    async fn orders_with_status(&self, status: OrderStatus) -> Result<Vec<Order>> {
        self.select(|o| o.status == status).await
    }

    async fn orders_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Order>> {
        self.select(|o| o.created_at >= start && o.created_at < end)
            .await
    }

    async fn count_orders(&self) -> Result<i64> {
        Ok(self.orders.read().await.len() as i64)
    }

    async fn update_status_if(
        &self,
        id: Uuid,
        expected: OrderStatus,
        to: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&id) {
            Some(order) if order.status == expected => {
                order.status = to;
                order.updated_at = updated_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_order(&self, id: Uuid) -> Result<bool> {
        Ok(self.orders.write().await.remove(&id).is_some())
    }
}

/// Mock user store that keeps accounts in memory.
#[derive(Default)]
pub struct MockUserStore {
    users: RwLock<HashMap<Uuid, User>>,
    fail_on_get: RwLock<bool>,
}

impl MockUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_get(&self, fail: bool) {
        *self.fail_on_get.write().await = fail;
    }

    async fn check_get(&self) -> Result<()> {
        if *self.fail_on_get.read().await {
            return Err(injected("get_user"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MockUserStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StorageError::Duplicate {
                entity: "email",
                key: user.email.clone(),
            });
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        self.check_get().await?;
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.check_get().await?;
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_user(&self, user: &User) -> Result<bool> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(StorageError::Duplicate {
                entity: "email",
                key: user.email.clone(),
            });
        }
        match users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.check_get().await?;
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    async fn users_with_role(&self, role: Role) -> Result<Vec<User>> {
        Ok(self
            .list_users()
            .await?
            .into_iter()
            .filter(|u| u.role == role)
            .collect())
    }
}
