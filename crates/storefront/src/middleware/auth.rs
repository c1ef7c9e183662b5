//! Authentication extractors.
//!
//! Handlers take [`RequireAuth`] (or [`OptionalAuth`]) to resolve the
//! caller. A request is authenticated either by the session cookie or by
//! an `Authorization: Bearer` token minted at `/auth/token`; both resolve
//! to the same [`CurrentUser`].

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{CurrentUser, session_keys};
use crate::services::tokens;
use crate::state::AppState;

/// Extractor that requires an authenticated customer.
///
/// Taking `RequireAuth(user)` as a handler argument guards the route and
/// hands the handler the signed-in customer, resolved from the session
/// cookie or a bearer token.
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_user(parts, state).await {
            Some(user) => Ok(Self(user)),
            None => Err(AppError::Unauthorized(
                "authentication required".to_string(),
            )),
        }
    }
}

/// Extractor that optionally resolves the customer.
///
/// Unlike [`RequireAuth`], this does not reject the request when nobody
/// is signed in; handlers get `None` and can serve the guest view.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_user(parts, state).await))
    }
}

/// Resolve the caller from the session cookie, then from a bearer token.
async fn resolve_user(parts: &Parts, state: &AppState) -> Option<CurrentUser> {
    // Session first (set by SessionManagerLayer)
    if let Some(session) = parts.extensions.get::<Session>()
        && let Ok(Some(user)) = session.get::<CurrentUser>(session_keys::CURRENT_USER).await
    {
        return Some(user);
    }

    // Fall back to a bearer token
    let header_value = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?;
    let token = header_value.strip_prefix("Bearer ")?;

    tokens::verify(token, &state.config().token_secret)
        .ok()
        .and_then(|claims| claims.into_current_user().ok())
}

/// Write the signed-in customer into the session after login.
///
/// # Errors
///
/// Returns the session store's error when the write fails.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Drop the signed-in customer from the session on logout.
///
/// # Errors
///
/// Returns the session store's error when the write fails.
pub async fn clear_current_user(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CurrentUser>(session_keys::CURRENT_USER).await?;
    Ok(())
}
