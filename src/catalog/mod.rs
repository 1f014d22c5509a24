//! Menu catalog administration and browsing.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::{now, Money, Product, ProductCreate, ProductFilter, ProductUpdate};
use crate::interfaces::{CatalogStore, StorageError};
use crate::utils::deadline::{within, DeadlineExceeded};

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid product: {0}")]
    Invalid(String),

    #[error("product {product_id} not found")]
    NotFound { product_id: Uuid },

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

impl CatalogError {
    fn storage(operation: &'static str, target: impl ToString, source: StorageError) -> Self {
        CatalogError::Storage {
            operation,
            target: target.to_string(),
            source,
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CatalogError::Invalid(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_price(price: Money) -> Result<()> {
    if price.is_negative() {
        return Err(CatalogError::Invalid("price must not be negative".to_string()));
    }
    Ok(())
}

fn validate_filter(filter: &ProductFilter) -> Result<()> {
    for price in [filter.min_price, filter.max_price].into_iter().flatten() {
        if price.is_negative() {
            return Err(CatalogError::Invalid(
                "price bounds must not be negative".to_string(),
            ));
        }
    }
    if let (Some(min), Some(max)) = (filter.min_price, filter.max_price) {
        if min > max {
            return Err(CatalogError::Invalid(
                "min_price must not exceed max_price".to_string(),
            ));
        }
    }
    Ok(())
}

pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    deadline: Duration,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: ProductCreate) -> Result<Product> {
        require_text("name", &input.name)?;
        require_text("category", &input.category)?;
        require_text("description", &input.description)?;
        require_price(input.price)?;

        let at = now();
        let product = Product {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            category: input.category.trim().to_string(),
            description: input.description,
            image_url: input.image_url,
            price: input.price,
            is_active: input.is_active,
            created_at: at,
            updated_at: at,
        };

        within(self.deadline, "insert_product", self.store.insert_product(&product))
            .await?
            .map_err(|e| CatalogError::storage("insert_product", product.id, e))?;

        info!(product_id = %product.id, price = %product.price, "Product created");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> Result<Product> {
        within(self.deadline, "get_product", self.store.get_product(id))
            .await?
            .map_err(|e| CatalogError::storage("get_product", id, e))?
            .ok_or(CatalogError::NotFound { product_id: id })
    }

    /// Apply the fields present in `update`.
    #[instrument(skip(self, update))]
    pub async fn update_product(&self, id: Uuid, update: ProductUpdate) -> Result<Product> {
        if let Some(name) = &update.name {
            require_text("name", name)?;
        }
        if let Some(category) = &update.category {
            require_text("category", category)?;
        }
        if let Some(description) = &update.description {
            require_text("description", description)?;
        }
        if let Some(price) = update.price {
            require_price(price)?;
        }

        let mut product = self.get_product(id).await?;
        update.apply(&mut product);
        product.updated_at = now();
        self.save(product).await
    }

    #[instrument(skip(self))]
    pub async fn activate(&self, id: Uuid) -> Result<Product> {
        self.set_active(id, true).await
    }

    #[instrument(skip(self))]
    pub async fn deactivate(&self, id: Uuid) -> Result<Product> {
        self.set_active(id, false).await
    }

    /// Existing orders keep their snapshot of the product.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<()> {
        let deleted = within(self.deadline, "delete_product", self.store.delete_product(id))
            .await?
            .map_err(|e| CatalogError::storage("delete_product", id, e))?;
        if !deleted {
            return Err(CatalogError::NotFound { product_id: id });
        }
        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        validate_filter(filter)?;
        within(self.deadline, "list_products", self.store.list_products(filter))
            .await?
            .map_err(|e| CatalogError::storage("list_products", "products", e))
    }

    #[instrument(skip(self))]
    pub async fn count_products(&self) -> Result<i64> {
        within(self.deadline, "count_products", self.store.count_products())
            .await?
            .map_err(|e| CatalogError::storage("count_products", "products", e))
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<Product> {
        let mut product = self.get_product(id).await?;
        if product.is_active == active {
            return Ok(product);
        }
        product.is_active = active;
        product.updated_at = now();
        let product = self.save(product).await?;
        info!(product_id = %id, active, "Product availability changed");
        Ok(product)
    }

    async fn save(&self, product: Product) -> Result<Product> {
        let updated = within(self.deadline, "update_product", self.store.update_product(&product))
            .await?
            .map_err(|e| CatalogError::storage("update_product", product.id, e))?;
        if !updated {
            return Err(CatalogError::NotFound {
                product_id: product.id,
            });
        }
        Ok(product)
    }
}
