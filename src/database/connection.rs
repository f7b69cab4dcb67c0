use std::time::Duration;

use serde::Serialize;
use sqlx::{PgPool, migrate::Migrator, postgres::PgPoolOptions};

use crate::{config::DatabaseConfig, error::Result};

static MIGRATOR: Migrator = sqlx::migrate!();

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PoolStatus {
    pub size: u32,
    pub idle: usize,
}

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.url)
        .await?;

    run_migrations(&pool).await?;

    tracing::info!(
        "Connected to store database ({} max connections, {}s acquire timeout)",
        config.max_connections,
        config.acquire_timeout_secs
    );

    Ok(pool)
}

/// Brings the products/orders/hero schema up to date before any handler runs.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR.run(pool).await?;

    match MIGRATOR.iter().last() {
        Some(latest) => tracing::info!(
            "Schema at migration {} ({}), {} known",
            latest.version,
            latest.description,
            MIGRATOR.iter().count()
        ),
        None => tracing::warn!("No migrations bundled"),
    }

    Ok(())
}

pub async fn check_health(pool: &PgPool) -> Result<PoolStatus> {
    sqlx::query("SELECT 1").fetch_one(pool).await?;

    Ok(PoolStatus {
        size: pool.size(),
        idle: pool.num_idle(),
    })
}
