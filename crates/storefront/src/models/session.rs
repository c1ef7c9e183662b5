//! What lives inside a customer session.

use serde::{Deserialize, Serialize};

use roastline_core::{Email, UserId};

/// The signed-in customer, as the auth extractors hand it to handlers.
///
/// Stored in the session on login; bearer-token requests reconstruct the
/// same type from the token claims without touching the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
}

/// Keys under which session values are stored.
pub mod keys {
    /// The signed-in customer ([`super::CurrentUser`]).
    pub const CURRENT_USER: &str = "current_user";

    /// The cart ([`crate::models::Cart`]).
    pub const CART: &str = "cart";

    /// Random state for the in-flight OAuth flow.
    pub const OAUTH_STATE: &str = "oauth_state";
}
