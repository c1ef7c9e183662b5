//! Password login, registration, and token endpoints.
//!
//! Session login/registration for browser clients plus a password grant
//! issuing bearer tokens for the mobile apps.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::AuthService;
use crate::services::tokens;
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Registration request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Login request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Session auth response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
}

/// Bearer token response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Establish the session for a freshly authenticated user.
async fn establish_session(session: &Session, user: &User) -> Result<()> {
    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
    };

    set_current_user(session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("failed to establish session: {e}")))?;

    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// Register with email and password. Signs the new user in.
///
/// POST /auth/register
#[instrument(skip(state, session, req))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let auth = AuthService::new(state.pool());
    let user = auth
        .register_with_password(&req.email, &req.password)
        .await?;

    establish_session(&session, &user).await?;

    tracing::info!(user_id = %user.id, "New customer registered");

    Ok((StatusCode::CREATED, Json(AuthResponse { user })))
}

/// Session login with email and password.
///
/// POST /auth/login
#[instrument(skip(state, session, req))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.pool());
    let user = auth.login_with_password(&req.email, &req.password).await?;

    establish_session(&session, &user).await?;

    Ok(Json(AuthResponse { user }))
}

/// Session logout.
///
/// POST /auth/logout
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session user: {e}");
    }

    // Also destroy the entire session (cart included)
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {e}");
    }

    clear_sentry_user();

    Ok(StatusCode::NO_CONTENT)
}

/// Password grant: verify credentials and mint a bearer token.
///
/// POST /auth/token
#[instrument(skip(state, req))]
pub async fn token(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let auth = AuthService::new(state.pool());
    let user = auth.login_with_password(&req.email, &req.password).await?;

    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
    };

    let ttl = state.config().token_ttl_seconds;
    let access_token = tokens::issue(&current, &state.config().token_secret, ttl)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: ttl,
    }))
}
