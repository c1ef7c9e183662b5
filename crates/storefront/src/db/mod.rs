//! Repositories over the shop schema.
//!
//! # Database: `roastline_shop`
//!
//! All tables live in the `shop` schema:
//!
//! - `shop.user` - Customer accounts (password and OAuth)
//! - `shop.user_password` - Argon2 password hashes
//! - `shop.product` - Coffee catalog
//! - `shop.pricing` - Unit pricing for custom blends (one active row)
//! - `shop.order` / `shop.order_item` - Orders with blend snapshots
//! - `shop.taste_profile` - Saved blend customizations (capped per user)
//! - `shop.review` - Product reviews (moderated)
//! - `shop.terms_version` - Terms and conditions versions
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! Schema migrations live in `crates/storefront/migrations/` and are
//! applied with `roastline migrate storefront`; the server never migrates
//! on boot.

pub mod orders;
pub mod pricing;
pub mod products;
pub mod reviews;
pub mod taste_profiles;
pub mod terms;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use orders::OrderRepository;
pub use pricing::PricingRepository;
pub use products::ProductRepository;
pub use reviews::ReviewRepository;
pub use taste_profiles::TasteProfileRepository;
pub use terms::TermsRepository;
pub use users::UserRepository;

/// Embedded migrations for the storefront database.
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
