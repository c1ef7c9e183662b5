//! Hosted-identity OAuth route handlers.
//!
//! The storefront drives the provider's hosted UI: `login` sends the
//! browser to the authorization page with a fresh CSRF state, `callback`
//! turns a successful return into a local session, and `logout` ends the
//! hosted session along with ours. Failures redirect back into the SPA
//! with an `error` query value instead of rendering anything here.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rand::seq::IndexedRandom;
use roastline_core::Email;
use serde::Deserialize;
use tower_sessions::Session;

use crate::db::UserRepository;
use crate::error::set_sentry_user;
use crate::middleware::set_current_user;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// What the provider appends to the callback redirect.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Single-use code for the token exchange.
    pub code: Option<String>,
    /// Echo of the CSRF state sent with the authorization request.
    pub state: Option<String>,
    /// Provider error code when authorization did not happen.
    pub error: Option<String>,
    /// Free-text detail accompanying `error`.
    pub error_description: Option<String>,
}

const STATE_LENGTH: usize = 32;

/// Alphanumeric token from the thread-local CSPRNG.
fn random_token(length: usize) -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::rng();
    (0..length)
        .filter_map(|_| ALPHABET.choose(&mut rng))
        .copied()
        .map(char::from)
        .collect()
}

/// Start a hosted login.
///
/// Stores a fresh CSRF state in the session and sends the browser to the
/// provider's authorization page.
///
/// # Route
///
/// `GET /auth/oauth/login`
pub async fn login(State(state): State<AppState>, session: Session) -> Response {
    let oauth_state = random_token(STATE_LENGTH);

    // The callback compares its `state` query value against this
    if let Err(e) = session
        .insert(session_keys::OAUTH_STATE, &oauth_state)
        .await
    {
        tracing::error!("Could not write OAuth state to the session: {e}");
        return Redirect::to("/login?error=session").into_response();
    }

    Redirect::to(&state.identity().authorize_url(&oauth_state)).into_response()
}

/// Complete a hosted login.
///
/// Rejects provider errors and state mismatches, exchanges the code,
/// resolves the provider identity to a local account, and signs the
/// session in. The final redirect is what gets the code and state out of
/// the browser's address bar.
///
/// # Route
///
/// `GET /auth/oauth/callback`
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if let Some(error) = query.error {
        tracing::warn!(
            provider_error = %error,
            detail = %query.error_description.unwrap_or_default(),
            "Identity provider reported an authorization failure"
        );
        return Redirect::to("/login?error=provider_denied").into_response();
    }

    let Some(code) = query.code else {
        tracing::warn!("OAuth callback arrived without a code");
        return Redirect::to("/login?error=missing_code").into_response();
    };

    let Some(returned_state) = query.state else {
        tracing::warn!("OAuth callback arrived without a state");
        return Redirect::to("/login?error=missing_state").into_response();
    };

    let stored_state: Option<String> = session
        .get(session_keys::OAUTH_STATE)
        .await
        .ok()
        .flatten();

    if stored_state.as_ref() != Some(&returned_state) {
        tracing::warn!("OAuth callback state does not match the session");
        return Redirect::to("/login?error=invalid_state").into_response();
    }

    // Each state value admits one callback
    let _ = session.remove::<String>(session_keys::OAUTH_STATE).await;

    let token = match state.identity().exchange_code(&code).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("OAuth code exchange failed: {e}");
            return Redirect::to("/login?error=token_exchange").into_response();
        }
    };

    let userinfo = match state.identity().fetch_userinfo(&token.access_token).await {
        Ok(info) => info,
        Err(e) => {
            tracing::error!("Could not fetch userInfo from the identity provider: {e}");
            return Redirect::to("/login?error=userinfo").into_response();
        }
    };

    let email = match Email::parse(&userinfo.email) {
        Ok(email) => email,
        Err(e) => {
            tracing::error!("Identity provider returned an unusable email: {e}");
            return Redirect::to("/login?error=userinfo").into_response();
        }
    };

    let users = UserRepository::new(state.pool());
    let user = match users
        .upsert_oauth_user(&email, &userinfo.sub, userinfo.name.as_deref())
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Could not upsert the OAuth account: {e}");
            return Redirect::to("/login?error=account").into_response();
        }
    };

    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
    };

    if let Err(e) = set_current_user(&session, &current).await {
        tracing::error!("Could not write the signed-in customer to the session: {e}");
        return Redirect::to("/login?error=session").into_response();
    }

    set_sentry_user(&user.id, Some(user.email.as_str()));

    tracing::info!(user_id = %user.id, "Customer signed in via the identity provider");

    // Lands the browser on a URL without the code and state
    Redirect::to("/account").into_response()
}

/// End the local and hosted sessions.
///
/// # Route
///
/// `POST /auth/oauth/logout`
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    if let Err(e) = session.flush().await {
        tracing::error!("Could not flush the session: {e}");
    }

    crate::error::clear_sentry_user();

    let post_logout_uri = format!("{}/", state.config().base_url);
    let logout_url = state.identity().logout_url(&post_logout_uri);

    Redirect::to(&logout_url).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_random_token_length_and_alphabet() {
        let token = random_token(STATE_LENGTH);
        assert_eq!(token.len(), STATE_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_random_tokens_differ() {
        assert_ne!(random_token(STATE_LENGTH), random_token(STATE_LENGTH));
    }
}
