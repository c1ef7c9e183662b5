//! Postgres-backed customer sessions.
//!
//! The cart and the signed-in customer live in the session, and both
//! survive a process restart. Rows go in the `tower_sessions` schema
//! created by migration; nothing calls the store's `migrate()`.

use sqlx::PgPool;
use tower_sessions::cookie::{SameSite, time::Duration};
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Cookie carrying the session id.
pub const SESSION_COOKIE_NAME: &str = "roastline_session";

/// Idle expiry. Carts older than this are gone.
const SESSION_IDLE_DAYS: i64 = 7;

/// Build the session layer over the shop database.
///
/// The cookie is HttpOnly and SameSite=Lax (the OAuth callback is a
/// cross-site top-level navigation, so Strict would drop the session).
/// Secure is keyed off the configured base URL scheme.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore> {
    SessionManagerLayer::new(PostgresStore::new(pool.clone()))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::days(SESSION_IDLE_DAYS)))
        .with_secure(config.base_url.starts_with("https://"))
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
