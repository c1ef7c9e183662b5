//! Business logic services for the back office: password authentication
//! for admin accounts (`auth`) and WooCommerce catalog and order
//! synchronization (`sync`).

pub mod auth;
pub mod sync;

pub use auth::{AdminAuthService, AuthError};
pub use sync::{SyncError, SyncService};
