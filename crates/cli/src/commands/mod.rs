//! CLI command implementations.

pub mod account;
pub mod migrate;
pub mod token;

use std::sync::Arc;

use grocery_server::config::ServerConfig;
use grocery_server::db::{self, PgStore};
use grocery_server::state::AppState;

/// Errors shared by the commands that talk to the database.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("configuration error: {0}")]
    Config(#[from] grocery_server::config::ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Service(#[from] grocery_server::services::ServiceError),
}

/// Build the same state the server runs with, backed by `PostgreSQL`.
async fn connect() -> Result<AppState, CommandError> {
    let config = ServerConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;

    Ok(AppState::new(config, Arc::new(PgStore::new(pool))))
}
