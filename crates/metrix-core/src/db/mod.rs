//! Postgres access: pool construction and the sqlx-backed store.

mod pg_store;

pub use pg_store::PgStore;

use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use thiserror::Error;

/// Database setup errors with contextual information
#[derive(Error, Debug)]
pub enum DbError {
    /// SQL query or connection error
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Database configuration is invalid or missing
    #[error("Database configuration error: {0}. Check DATABASE_URL and connection settings.")]
    Config(String),
}

impl DbError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: Option<u64>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: crate::config::DEFAULT_DATABASE_URL.to_string(),
            max_connections: crate::config::DEFAULT_DATABASE_MAX_CONNECTIONS,
            min_connections: crate::config::DEFAULT_DATABASE_MIN_CONNECTIONS,
            connect_timeout_secs: crate::config::DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
            idle_timeout_secs: Some(crate::config::DEFAULT_DATABASE_IDLE_TIMEOUT_SECS),
        }
    }
}

pub async fn create_pool(config: &DbConfig) -> DbResult<PgPool> {
    if config.url.is_empty() {
        return Err(DbError::config("DATABASE_URL is empty"));
    }

    let mut options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs));

    if let Some(idle_timeout) = config.idle_timeout_secs {
        options = options.idle_timeout(Duration::from_secs(idle_timeout));
    }

    let pool = options.connect(&config.url).await?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database connection pool created"
    );

    Ok(pool)
}

/// Apply the schema under `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> DbResult<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

pub async fn health_check(pool: &PgPool) -> DbResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(DbError::from)
}
