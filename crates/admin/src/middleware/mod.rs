//! Middleware for the admin API.
//!
//! `main.rs` stacks the layers so that Sentry wraps everything, the
//! `TraceLayer` spans sit inside it, and the tower-sessions layer runs
//! innermost. Authentication is enforced per-route through the extractors
//! in [`auth`], not as a blanket layer, so `/health` and the webhook
//! endpoint stay reachable without a session.

pub mod auth;
pub mod session;

pub use auth::{
    RequireAdminAuth, RequireSuperAdmin, RequireWriteAccess, clear_current_admin,
    set_current_admin,
};
pub use session::create_session_layer;
