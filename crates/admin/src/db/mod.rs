//! Repositories for the two databases the admin binary opens.
//!
//! One pool per database:
//!
//! # Database: `roastline_admin` (the `admin` schema)
//!
//! - `admin.admin_user` - Back-office accounts with roles and password hashes
//! - `admin.media_asset` - Metadata for uploaded media files
//! - `admin.sync_run` - History of WooCommerce synchronization runs
//! - `admin.session` - Tower-sessions storage
//!
//! # Database: `roastline_shop` (the `shop` schema, owned by the storefront)
//!
//! The admin binary opens a second pool to the shop database for catalog,
//! order, review, pricing and terms management. Only the storefront's
//! migrator touches that database; this crate's migrations cover the
//! admin database alone:
//!
//! ```bash
//! cargo run -p roastline-cli -- migrate admin
//! ```

pub mod admin_users;
pub mod catalog;
pub mod customers;
pub mod media;
pub mod orders;
pub mod pricing;
pub mod reviews;
pub mod sync_runs;
pub mod terms;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admin_users::AdminUserRepository;
pub use catalog::CatalogRepository;
pub use customers::CustomerRepository;
pub use media::MediaRepository;
pub use orders::OrderRepository;
pub use pricing::PricingRepository;
pub use reviews::ReviewRepository;
pub use sync_runs::SyncRunRepository;
pub use terms::TermsRepository;

/// Embedded migrations for the admin database.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Failure surface shared by every repository in this module.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Query or connection failure from sqlx.
    #[error("query failed: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value no longer parses into its domain type.
    #[error("stored value unusable: {0}")]
    DataCorruption(String),

    /// Nothing matched the identifier.
    #[error("no matching row")]
    NotFound,

    /// A uniqueness or integrity constraint fired.
    #[error("integrity violation: {0}")]
    Conflict(String),
}

/// Open a `PostgreSQL` pool sized for a single service instance.
///
/// # Errors
///
/// Returns `sqlx::Error` when the server is unreachable or refuses the
/// credentials.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
