//! Order routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::error::ApiError;
use super::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use super::AppState;
use crate::domain::{Capability, CartLine, Order, OrderStatus};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(place_order))
        .route("/orders/today", get(orders_today))
        .route("/orders/count", get(count_orders))
        .route("/orders/:id", get(get_order).delete(delete_order))
        .route("/orders/:id/status", patch(update_status))
}

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    /// Defaults to the caller.
    pub customer_id: Option<Uuid>,
    #[serde(default)]
    pub items: Vec<CartLine>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    pub customer_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
    pub expected_status: Option<OrderStatus>,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

// ============================================================================
// Handlers
// ============================================================================

async fn place_order(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(req): ApiJson<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    caller.require(Capability::PlaceOrders)?;
    let customer_id = req.customer_id.unwrap_or(caller.id);
    if customer_id != caller.id {
        caller.require(Capability::ManageOrders)?;
    }

    let order = state
        .orders
        .place_order(customer_id, &req.items, req.note)
        .await?;
    info!(order_id = %order.id, placed_by = %caller.id, "Order accepted");
    Ok((StatusCode::CREATED, Json(order)))
}

/// `?status=` lists by status (staff), `?customer_id=` lists a customer's
/// orders, and with neither the caller's own orders are returned.
async fn list_orders(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiQuery(query): ApiQuery<OrderQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = match (query.customer_id, query.status) {
        (None, Some(status)) => {
            caller.require(Capability::ReadOrders)?;
            state.orders.orders_with_status(status).await?
        }
        (customer_id, status) => {
            let customer_id = customer_id.unwrap_or(caller.id);
            if customer_id != caller.id {
                caller.require(Capability::ReadOrders)?;
            }
            let mut orders = state.orders.orders_for_customer(customer_id).await?;
            if let Some(status) = status {
                orders.retain(|order| order.status == status);
            }
            orders
        }
    };
    Ok(Json(orders))
}

async fn orders_today(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Vec<Order>>, ApiError> {
    caller.require(Capability::ReadOrders)?;
    Ok(Json(state.orders.orders_today().await?))
}

async fn count_orders(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<CountResponse>, ApiError> {
    caller.require(Capability::ReadOrders)?;
    let count = state.orders.count_orders().await?;
    Ok(Json(CountResponse { count }))
}

/// Other customers' orders look absent to callers without `ReadOrders`.
async fn get_order(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Order>, ApiError> {
    let order = state.orders.get_order(id).await?;
    if order.customer_id != caller.id && !caller.can(Capability::ReadOrders) {
        return Err(ApiError::not_found(format!("order {id} not found")));
    }
    Ok(Json(order))
}

async fn update_status(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(change): ApiJson<StatusChange>,
) -> Result<Json<Order>, ApiError> {
    caller.require(Capability::ManageOrders)?;
    let order = state
        .orders
        .transition(id, change.status, change.expected_status)
        .await?;
    Ok(Json(order))
}

async fn delete_order(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    caller.require(Capability::DeleteOrders)?;
    state.orders.delete_order(id).await?;
    info!(order_id = %id, deleted_by = %caller.id, "Order deleted");
    Ok(StatusCode::NO_CONTENT)
}
