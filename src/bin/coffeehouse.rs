//! coffeehouse: ordering backend server
//!
//! ## Configuration
//! - `--config <path>` or COFFEEHOUSE_CONFIG: YAML config file (optional)
//! - COFFEEHOUSE__SERVER__PORT etc.: per-field overrides
//! - COFFEEHOUSE_LOG: tracing filter (default: info)

use tracing::{error, info};

use coffeehouse::config::Config;
use coffeehouse::http::{self, AppState};
use coffeehouse::storage::{init_storage, init_token_store};
use coffeehouse::utils::bootstrap::{init_tracing, parse_config_path};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();

    let config_path = parse_config_path();
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        storage = %config.storage.storage_type,
        port = config.server.port,
        "Starting coffeehouse"
    );

    let stores = init_storage(&config.storage).await?;
    let tokens = init_token_store(&config.cache).await?;
    let state = AppState::new(&config, &stores, tokens)?;

    if let Some(admin) = &config.auth.bootstrap_admin {
        let user = state.users.ensure_admin(admin).await?;
        info!(user_id = %user.id, email = %user.email, "Bootstrap admin ready");
    }

    http::serve(
        state,
        &config.server.host,
        config.server.port,
        config.server.request_timeout(),
    )
    .await
}
