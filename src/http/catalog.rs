//! Product routes. Browsing works without a token; non-staff callers only
//! ever see active products.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use super::error::ApiError;
use super::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use super::AppState;
use crate::domain::{ActiveFilter, Capability, Money, Product, ProductCreate, ProductFilter, ProductUpdate};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/products/:id/activate", post(activate_product))
        .route("/products/:id/deactivate", post(deactivate_product))
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub q: Option<String>,
    pub status: Option<ActiveFilter>,
}

impl ProductQuery {
    fn into_filter(self, staff: bool) -> ProductFilter {
        let active = match self.status {
            Some(status) if staff => status,
            _ => ActiveFilter::Active,
        };
        ProductFilter {
            active,
            category: self.category.filter(|c| !c.is_empty()),
            min_price: self.min_price.map(Money::from_minor),
            max_price: self.max_price.map(Money::from_minor),
            search: self.q.filter(|q| !q.is_empty()),
        }
    }
}

fn is_staff(caller: &Option<AuthUser>) -> bool {
    caller
        .as_ref()
        .is_some_and(|c| c.can(Capability::ManageProducts))
}

async fn list_products(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let filter = query.into_filter(is_staff(&caller));
    Ok(Json(state.catalog.list_products(&filter).await?))
}

async fn get_product(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Product>, ApiError> {
    let product = state.catalog.get_product(id).await?;
    if !product.is_active && !is_staff(&caller) {
        return Err(ApiError::not_found(format!("product {id} not found")));
    }
    Ok(Json(product))
}

async fn create_product(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(input): ApiJson<ProductCreate>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    caller.require(Capability::ManageProducts)?;
    let product = state.catalog.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<ProductUpdate>,
) -> Result<Json<Product>, ApiError> {
    caller.require(Capability::ManageProducts)?;
    Ok(Json(state.catalog.update_product(id, update).await?))
}

async fn activate_product(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Product>, ApiError> {
    caller.require(Capability::ManageProducts)?;
    Ok(Json(state.catalog.activate(id).await?))
}

async fn deactivate_product(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Product>, ApiError> {
    caller.require(Capability::ManageProducts)?;
    Ok(Json(state.catalog.deactivate(id).await?))
}

async fn delete_product(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    caller.require(Capability::ManageProducts)?;
    state.catalog.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_staff_always_filtered_to_active() {
        let query = ProductQuery {
            status: Some(ActiveFilter::All),
            ..Default::default()
        };
        assert_eq!(query.into_filter(false).active, ActiveFilter::Active);

        let query = ProductQuery {
            status: Some(ActiveFilter::Inactive),
            q: Some(String::new()),
            ..Default::default()
        };
        let filter = query.into_filter(true);
        assert_eq!(filter.active, ActiveFilter::Inactive);
        assert!(filter.search.is_none());
    }
}
