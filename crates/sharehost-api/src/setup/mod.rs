//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;

use std::sync::Arc;

use anyhow::{Context, Result};
use sharehost_core::Config;

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    sharehost_infra::init_telemetry(config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.server().environment,
        base_url = %config.base_url(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;

    let state = services::initialize_services(config, pool).await?;

    services::prepare_user_directories(&state).await;

    let router = routes::setup_routes(state.clone());

    Ok((state, router))
}
