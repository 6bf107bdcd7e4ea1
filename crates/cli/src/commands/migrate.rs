//! Database migration command.
//!
//! Applies the migrations in `crates/server/migrations/`.
//!
//! # Environment Variables
//!
//! - `GROCERY_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

use super::CommandError;

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `CommandError` if the URL is missing, the database is unreachable,
/// or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}

/// Migrations only need the database, not the full server configuration.
fn database_url() -> Result<SecretString, CommandError> {
    std::env::var("GROCERY_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| {
            CommandError::Config(grocery_server::config::ConfigError::MissingEnvVar(
                "GROCERY_DATABASE_URL".to_string(),
            ))
        })
}
