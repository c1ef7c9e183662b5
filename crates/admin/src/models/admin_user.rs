//! Admin account domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use roastline_core::{AdminUserId, Email};

pub use roastline_core::AdminRole;

/// A back-office account.
///
/// Separate from storefront customers: admin accounts live in their own
/// database, always have a password, and carry a role that gates writes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: Email,
    pub name: String,
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
