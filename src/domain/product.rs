//! Catalog products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Money;

/// A menu product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: String,
    pub image_url: String,
    /// Current unit price. Orders snapshot this at creation time.
    pub price: Money,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    pub price: Money,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<Money>,
}

impl ProductUpdate {
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(image_url) = self.image_url {
            product.image_url = image_url;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
    }
}

/// Which products a listing includes by active flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveFilter {
    #[default]
    Active,
    Inactive,
    All,
}

impl ActiveFilter {
    pub fn matches(self, is_active: bool) -> bool {
        match self {
            ActiveFilter::Active => is_active,
            ActiveFilter::Inactive => !is_active,
            ActiveFilter::All => true,
        }
    }
}

/// Catalog listing filter. All criteria are combined with AND.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub active: ActiveFilter,
    pub category: Option<String>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    /// Case-insensitive substring of the product name.
    pub search: Option<String>,
}

impl ProductFilter {
    /// In-memory evaluation, used by the mock store.
    pub fn matches(&self, product: &Product) -> bool {
        if !self.active.matches(product.is_active) {
            return false;
        }
        if let Some(category) = &self.category {
            if &product.category != category {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if product.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if product.price > max {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !product
                .name
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latte() -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            name: "Oat Latte".to_string(),
            category: "coffee".to_string(),
            description: "Espresso with oat milk".to_string(),
            image_url: String::new(),
            price: Money::from_minor(420),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_filter_combines_criteria() {
        let product = latte();
        let filter = ProductFilter {
            category: Some("coffee".to_string()),
            min_price: Some(Money::from_minor(400)),
            max_price: Some(Money::from_minor(500)),
            search: Some("LATTE".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&product));

        let wrong_category = ProductFilter {
            category: Some("tea".to_string()),
            ..Default::default()
        };
        assert!(!wrong_category.matches(&product));
    }

    #[test]
    fn test_default_filter_hides_inactive() {
        let mut product = latte();
        product.is_active = false;
        assert!(!ProductFilter::default().matches(&product));
        let all = ProductFilter {
            active: ActiveFilter::All,
            ..Default::default()
        };
        assert!(all.matches(&product));
    }

    #[test]
    fn test_update_applies_only_present_fields() {
        let mut product = latte();
        ProductUpdate {
            price: Some(Money::from_minor(450)),
            ..Default::default()
        }
        .apply(&mut product);
        assert_eq!(product.price, Money::from_minor(450));
        assert_eq!(product.name, "Oat Latte");
    }
}
