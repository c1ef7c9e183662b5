//! Postgres-backed admin sessions.
//!
//! Kept fully separate from storefront customer sessions: the rows live
//! in `admin.session` in the admin database, the cookie has its own name,
//! and the policy is tighter (SameSite=Strict, 24 hour idle expiry).

use sqlx::PgPool;
use tower_sessions::cookie::{SameSite, time::Duration};
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AdminConfig;

/// Session cookie name for the back office.
pub const SESSION_COOKIE_NAME: &str = "roastline_admin_session";

/// Idle expiry. Admins sign back in daily.
const SESSION_IDLE_HOURS: i64 = 24;

/// Build the session layer over the admin database.
///
/// The `admin.session` table is created by migration; nothing calls the
/// store's `migrate()`.
///
/// # Panics
///
/// Panics if the store rejects the schema or table name, which cannot
/// happen for the hardcoded `admin` / `session` pair.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &AdminConfig,
) -> SessionManagerLayer<PostgresStore> {
    let store = PostgresStore::new(pool.clone())
        .with_schema_name("admin")
        .expect("valid schema name")
        .with_table_name("session")
        .expect("valid table name");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::hours(SESSION_IDLE_HOURS)))
        .with_secure(config.base_url.starts_with("https://"))
        .with_same_site(SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
