use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use reelshelf_core::{
    MIGRATOR,
    application::{AppUnitOfWork, RbacBootstrapService},
};
use reelshelf_model::Role;

use crate::infra::config::Config;

const MAX_DB_CONNECTIONS: u32 = 10;

/// Open the configured store. Without a database URL the service runs on
/// the in-memory store.
pub async fn open_store(config: &Config) -> anyhow::Result<Arc<AppUnitOfWork>> {
    let Some(url) = config.database.url.as_deref() else {
        warn!("Running on the in-memory store");
        return Ok(Arc::new(AppUnitOfWork::in_memory()));
    };

    let pool = connect_pool(url).await?;
    MIGRATOR
        .run(&pool)
        .await
        .context("failed to apply database migrations")?;

    let uow = AppUnitOfWork::from_postgres(pool)
        .map_err(|err| anyhow::anyhow!(err))
        .context("failed to assemble repositories")?;
    Ok(Arc::new(uow))
}

pub async fn connect_pool(url: &str) -> anyhow::Result<sqlx::PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_DB_CONNECTIONS)
        .connect(url)
        .await
        .context("failed to connect to PostgreSQL")?;
    info!("Connected to PostgreSQL");
    Ok(pool)
}

/// Apply migrations and exit; used by `db migrate`.
pub async fn run_migrations(config: &Config) -> anyhow::Result<()> {
    let url = config
        .database
        .url
        .as_deref()
        .context("DATABASE_URL is required to run migrations")?;
    let pool = connect_pool(url).await?;
    MIGRATOR
        .run(&pool)
        .await
        .context("failed to apply database migrations")?;
    info!("Database migrations applied");
    Ok(())
}

/// Reconcile the built-in roles.
pub async fn seed_roles(uow: &AppUnitOfWork) -> anyhow::Result<Vec<Role>> {
    RbacBootstrapService::new(Arc::clone(&uow.roles))
        .ensure_defaults()
        .await
        .context("failed to seed roles")
}
