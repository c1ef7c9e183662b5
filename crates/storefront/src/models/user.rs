//! Customer account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use roastline_core::{Email, UserId};

/// A storefront customer account, as returned by the profile endpoints.
///
/// Created either by password registration or by the first OAuth login
/// through the hosted identity provider. OAuth-only accounts have no
/// password credential.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    /// Display name shown in the apps.
    pub display_name: Option<String>,
    /// Marketing email opt-in.
    pub marketing_opt_in: bool,
    /// Set on OAuth logins; password accounts start unverified.
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
