use std::env;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use timesheet_engine::api::{AppState, create_router};
use timesheet_engine::config::ConfigLoader;
use timesheet_engine::store::InMemoryStore;

const DEFAULT_CONFIG_DIR: &str = "config/default";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config_dir = env::var("TIMESHEET_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

    let config = ConfigLoader::load(&config_dir)?;
    let state = AppState::new(config, Arc::new(InMemoryStore::new()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(bind_addr = %bind_addr, config_dir = %config_dir, "Timesheet engine listening");
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
