//! Product catalog storage interface.

use async_trait::async_trait;
use uuid::Uuid;

use super::Result;
use crate::domain::{Product, ProductFilter};

/// Interface for product persistence.
///
/// Implementations:
/// - `SqlCatalogStore`: SQLite / PostgreSQL
/// - `MockCatalogStore`: in-memory, for tests
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_product(&self, product: &Product) -> Result<()>;

    /// Current state of a product, including its price and active flag.
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>>;

    /// Overwrite every mutable column. Returns false if the product is absent.
    async fn update_product(&self, product: &Product) -> Result<bool>;

    /// Returns false if the product is absent.
    async fn delete_product(&self, id: Uuid) -> Result<bool>;

    /// Products matching `filter`, ordered by name.
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>>;

    async fn count_products(&self) -> Result<i64>;
}
