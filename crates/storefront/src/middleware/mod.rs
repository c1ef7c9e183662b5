//! Session, auth extraction, and rate limiting.
//!
//! Request order outermost-in: Sentry, then the session layer, then the
//! per-route-group rate limiters. The auth extractors run last, inside
//! the handlers' argument lists.

pub mod auth;
pub mod rate_limit;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use session::create_session_layer;
