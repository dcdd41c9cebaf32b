pub mod admin;
pub mod migrate;
pub mod serve;

use std::sync::Arc;

use anyhow::Context;

use crate::config::AppConfig;
use crate::database::{DatabaseManager, MemoryStore, PgStore, Store};

/// Open the configured store. Without DATABASE_URL the process runs on the
/// in-memory store and nothing survives a restart.
pub async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
    if config.database.url.is_none() {
        tracing::warn!("DATABASE_URL is not set; using the in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;

    if config.database.run_migrations {
        DatabaseManager::migrate(&pool)
            .await
            .context("failed to apply migrations")?;
    }

    Ok(Arc::new(PgStore::new(pool)))
}
