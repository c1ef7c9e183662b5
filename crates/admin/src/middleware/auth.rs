//! Authentication extractors for admin routes.
//!
//! Three tiers: [`RequireAdminAuth`] for any signed-in admin,
//! [`RequireWriteAccess`] for roles allowed to mutate, and
//! [`RequireSuperAdmin`] for account management. The API is JSON-only, so
//! rejections are JSON error bodies rather than login redirects.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use roastline_core::AdminRole;

use crate::models::{CurrentAdmin, session_keys};

/// Extractor that requires a signed-in admin of any role.
///
/// Taking `RequireAdminAuth(admin)` as a handler argument both guards the
/// route and hands the handler the acting admin.
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Extractor that requires a role allowed to mutate data.
///
/// Viewers can read everything but are rejected here with a 403.
pub struct RequireWriteAccess(pub CurrentAdmin);

/// Extractor that requires the `super_admin` role.
pub struct RequireSuperAdmin(pub CurrentAdmin);

/// Rejection for the auth extractors.
pub enum AuthRejection {
    /// Nobody is signed in.
    Unauthorized,
    /// Signed in, but the role doesn't allow this.
    Forbidden(&'static str),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required"),
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, message),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        resolve_admin(parts)
            .await
            .map(Self)
            .ok_or(AuthRejection::Unauthorized)
    }
}

impl<S> FromRequestParts<S> for RequireWriteAccess
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = resolve_admin(parts)
            .await
            .ok_or(AuthRejection::Unauthorized)?;

        if !admin.role.can_write() {
            return Err(AuthRejection::Forbidden("Write access required"));
        }

        Ok(Self(admin))
    }
}

impl<S> FromRequestParts<S> for RequireSuperAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = resolve_admin(parts)
            .await
            .ok_or(AuthRejection::Unauthorized)?;

        if admin.role != AdminRole::SuperAdmin {
            return Err(AuthRejection::Forbidden("Super admin access required"));
        }

        Ok(Self(admin))
    }
}

/// Resolve the signed-in admin from the session.
async fn resolve_admin(parts: &Parts) -> Option<CurrentAdmin> {
    let session = parts.extensions.get::<Session>()?;

    session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
}

/// Write the signed-in admin into the session after login.
///
/// # Errors
///
/// Returns the session store's error when the write fails.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Drop the signed-in admin from the session on logout.
///
/// # Errors
///
/// Returns the session store's error when the write fails.
pub async fn clear_current_admin(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    Ok(())
}
