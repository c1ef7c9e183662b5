//! Schema migration commands.
//!
//! The storefront migrations build the `shop` schema; the admin migrations
//! build the `admin` schema (accounts, sessions, media metadata, sync
//! history). Both servers connect to their databases at startup but neither
//! runs migrations; that happens here.
//!
//! # Environment
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string for the shop database
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string for the admin database

use sqlx::PgPool;
use thiserror::Error;

/// Failure modes of the migrate commands.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The connection string variable was never set.
    #[error("environment variable {0} is not set")]
    MissingEnvVar(&'static str),

    /// Could not reach or query the database.
    #[error("database failure: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Bring the shop schema up to date.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration
/// fails to apply.
pub async fn storefront() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .map_err(|_| MigrationError::MissingEnvVar("STOREFRONT_DATABASE_URL"))?;

    tracing::info!("Opening the shop database");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Applying shop schema migrations");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Shop schema is up to date");
    Ok(())
}

/// Bring the admin schema up to date.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration
/// fails to apply.
pub async fn admin() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("ADMIN_DATABASE_URL")
        .map_err(|_| MigrationError::MissingEnvVar("ADMIN_DATABASE_URL"))?;

    tracing::info!("Opening the admin database");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Applying admin schema migrations");
    roastline_admin::db::MIGRATOR.run(&pool).await?;

    tracing::info!("Admin schema is up to date");
    Ok(())
}
