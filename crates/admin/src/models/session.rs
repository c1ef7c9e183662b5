//! What lives inside an admin session.

use serde::{Deserialize, Serialize};

use roastline_core::{AdminRole, AdminUserId, Email};

/// The signed-in admin, as the auth extractors hand it to handlers.
///
/// Carries the role so permission checks don't need a database read on
/// every request; a role change takes effect on the next login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: AdminUserId,
    pub email: Email,
    pub name: String,
    pub role: AdminRole,
}

/// Keys under which session values are stored.
pub mod keys {
    /// The signed-in admin ([`super::CurrentAdmin`]).
    pub const CURRENT_ADMIN: &str = "current_admin";
}
