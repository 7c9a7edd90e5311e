//! Database setup and initialization

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use sharehost_core::Config;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Setup database connection pool and run migrations
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let server = config.server();

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(server.db_max_connections)
        .acquire_timeout(Duration::from_secs(server.db_timeout_seconds))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&server.database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = server.db_max_connections,
        "Database connected successfully"
    );

    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir)
        .await
        .context("Failed to load migrations")?;
    migrator
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
