//! Terms and conditions route handlers.
//!
//! Versions are immutable once created; publishing happens by activating
//! a draft, which retires whichever version was active before.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use roastline_core::TermsVersionId;

use crate::db::TermsRepository;
use crate::db::terms::TermsVersion;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdminAuth, RequireWriteAccess};
use crate::state::AppState;

/// Draft creation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTermsRequest {
    /// Human-facing version label, e.g. `2026-03`.
    pub version: String,
    pub body: String,
}

/// List all versions, newest first.
///
/// GET /terms
#[instrument(skip(_admin, state))]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<TermsVersion>>> {
    let versions = TermsRepository::new(state.shop_pool()).list_all().await?;

    Ok(Json(versions))
}

/// Create a draft version.
///
/// POST /terms
#[instrument(skip(admin, state, req), fields(admin_id = %admin.id))]
pub async fn create(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Json(req): Json<CreateTermsRequest>,
) -> Result<(StatusCode, Json<TermsVersion>)> {
    if req.version.trim().is_empty() {
        return Err(AppError::BadRequest("version label is required".to_string()));
    }
    if req.body.trim().is_empty() {
        return Err(AppError::BadRequest("terms body is required".to_string()));
    }

    let version = TermsRepository::new(state.shop_pool())
        .create_draft(&req.version, &req.body)
        .await?;

    Ok((StatusCode::CREATED, Json(version)))
}

/// Publish a version, deactivating the rest.
///
/// POST /terms/{id}/activate
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn activate(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<TermsVersionId>,
) -> Result<Json<TermsVersion>> {
    let version = TermsRepository::new(state.shop_pool()).activate(id).await?;

    tracing::info!(terms_id = %id, version = %version.version, "Terms version published");

    Ok(Json(version))
}
