//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a new admin account
//! roastline admin create -e admin@example.com -n "Admin Name" -r super_admin -p <password>
//! ```
//!
//! # Environment
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string for the admin database

use secrecy::SecretString;
use thiserror::Error;

use roastline_admin::db;
use roastline_admin::services::{AdminAuthService, AuthError};
use roastline_core::AdminRole;

/// Failures specific to the `admin create` command.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The connection string variable was never set.
    #[error("environment variable {0} is not set")]
    MissingEnvVar(&'static str),

    /// The admin database refused us.
    #[error("cannot reach the admin database: {0}")]
    Database(#[from] sqlx::Error),

    /// `-r` was something other than the three known roles.
    #[error("unknown role {0:?}, expected super_admin, admin, or viewer")]
    InvalidRole(String),

    /// The auth service rejected the account.
    #[error("{0}")]
    Auth(#[from] AuthError),
}

/// Create an admin account and return its ID.
///
/// Goes through the same `AdminAuthService` the admin binary uses, so the
/// password is validated and hashed with Argon2id identically to accounts
/// created over the API.
///
/// # Errors
///
/// Returns `AdminError` if the role is unknown, the email is invalid or
/// already registered, the password is too weak, or the database is
/// unreachable.
pub async fn create_user(
    email: &str,
    name: &str,
    role: &str,
    password: &str,
) -> Result<i32, AdminError> {
    dotenvy::dotenv().ok();

    let role: AdminRole = role
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))?;

    let database_url = std::env::var("ADMIN_DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| AdminError::MissingEnvVar("ADMIN_DATABASE_URL"))?;

    let pool = db::create_pool(&database_url).await?;

    tracing::info!(email, %role, "Creating admin account");

    let auth = AdminAuthService::new(&pool);
    let admin = auth.create_admin(email, name, role, password).await?;

    tracing::info!(id = %admin.id, email = %admin.email, %admin.role, "Admin account created");

    Ok(admin.id.as_i32())
}
