//! REST API over the order, catalog and account services.

mod catalog;
pub mod error;
pub mod extract;
mod orders;
mod users;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::{AuthService, PasswordHasher, TokenIssuer, UserService};
use crate::catalog::CatalogService;
use crate::config::Config;
use crate::interfaces::TokenStore;
use crate::orders::OrderService;
use crate::storage::Stores;

pub use error::ApiError;
pub use extract::AuthUser;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<OrderService>,
    pub catalog: Arc<CatalogService>,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
}

impl AppState {
    /// Wire the services over `stores` and `tokens` from configuration.
    pub fn new(
        config: &Config,
        stores: &Stores,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, ::config::ConfigError> {
        let deadline = config.storage.operation_timeout();
        let hasher = PasswordHasher::new(config.auth.bcrypt_cost);
        let issuer = TokenIssuer::new(&config.auth.jwt_secret, config.auth.access_token_ttl());

        Ok(Self {
            orders: Arc::new(OrderService::new(
                stores,
                deadline,
                config.orders.day_offset()?,
            )),
            catalog: Arc::new(CatalogService::new(stores.catalog.clone(), deadline)),
            auth: Arc::new(AuthService::new(
                stores.users.clone(),
                tokens.clone(),
                issuer,
                hasher.clone(),
                config.auth.refresh_token_ttl(),
                deadline,
            )),
            users: Arc::new(UserService::new(
                stores.users.clone(),
                tokens,
                hasher,
                deadline,
            )),
        })
    }
}

/// Build the router with tracing, CORS and a per-request timeout.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .merge(users::routes())
        .merge(catalog::routes())
        .merge(orders::routes())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve the API until Ctrl-C.
pub async fn serve(
    state: AppState,
    host: &str,
    port: u16,
    request_timeout: Duration,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(state, request_timeout);

    let listener = TcpListener::bind((host, port)).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "Coffeehouse API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Coffeehouse API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
