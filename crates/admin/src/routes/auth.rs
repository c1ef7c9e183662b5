//! Login, logout and the current-account endpoint.
//!
//! Email + password session login for back-office accounts. There is no
//! self-registration; accounts are created by a super admin or the CLI.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAdminAuth, clear_current_admin, set_current_admin};
use crate::models::{AdminUser, CurrentAdmin};
use crate::services::AdminAuthService;
use crate::state::AppState;

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
    pub admin: AdminUser,
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
    let auth = AdminAuthService::new(state.admin_pool());
    let admin = auth.login_with_password(&req.email, &req.password).await?;

    let current = CurrentAdmin {
        id: admin.id,
        email: admin.email.clone(),
        name: admin.name.clone(),
        role: admin.role,
    };

    set_current_admin(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("failed to establish session: {e}")))?;

    set_sentry_user(&admin.id, Some(admin.email.as_str()));

    tracing::info!(admin_id = %admin.id, role = %admin.role, "Admin logged in");

    Ok(Json(AuthResponse { admin }))
}

/// Session logout.
///
/// POST /auth/logout
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::error!("Failed to clear session admin: {e}");
    }

    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {e}");
    }

    clear_sentry_user();

    Ok(StatusCode::NO_CONTENT)
}

/// Current admin from the session.
///
/// GET /auth/me
#[instrument(skip(admin))]
pub async fn me(RequireAdminAuth(admin): RequireAdminAuth) -> Json<CurrentAdmin> {
    Json(admin)
}
