use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tokio::sync::OnceCell;

use crate::config::Config;
use crate::error::AppResult;
use crate::repository::{MemoryTeamRepository, PgTeamRepository, TeamRepository};

static STORE: OnceCell<Arc<dyn TeamRepository>> = OnceCell::const_new();

/// Process-wide store handle. The first caller connects; everyone after that
/// gets the same handle.
pub async fn shared_store(config: &Config) -> AppResult<Arc<dyn TeamRepository>> {
    let store = STORE.get_or_try_init(|| connect(config)).await?;
    Ok(Arc::clone(store))
}

/// Closes the shared store, if it was ever opened.
pub async fn shutdown() {
    if let Some(store) = STORE.get() {
        store.close().await;
        tracing::info!("Store connection closed");
    }
}

pub async fn connect(config: &Config) -> AppResult<Arc<dyn TeamRepository>> {
    if config.uses_memory_store() {
        tracing::warn!("Using in-memory team store; data is lost on exit");
        return Ok(Arc::new(MemoryTeamRepository::new()));
    }

    let pool = create_pool(config).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Connected to PostgreSQL");
    Ok(Arc::new(PgTeamRepository::new(pool)))
}

pub async fn create_pool(config: &Config) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .min_connections(config.db.pool_min)
        .max_connections(config.db.pool_max)
        .acquire_timeout(Duration::from_secs(config.db.acquire_timeout_secs))
        .connect(&config.db.url)
        .await?;
    Ok(pool)
}
