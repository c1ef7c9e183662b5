//! Saved taste profile route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use roastline_core::{TasteProfile, TasteProfileId};

use crate::db::TasteProfileRepository;
use crate::db::taste_profiles::SavedTasteProfile;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Save taste profile request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProfileRequest {
    pub name: String,
    pub profile: TasteProfile,
}

/// List the caller's saved profiles, oldest first.
///
/// GET /account/taste-profiles
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<SavedTasteProfile>>> {
    let profiles = TasteProfileRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(Json(profiles))
}

/// Save a blend to the caller's library.
///
/// POST /account/taste-profiles
///
/// Saving a blend identical to an already-saved one returns the existing
/// entry unchanged. Otherwise the blend is inserted and, if the library is
/// over its cap, the oldest entry is evicted.
#[instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn save(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<SaveProfileRequest>,
) -> Result<Json<SavedTasteProfile>> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("profile name is required".to_string()));
    }

    let saved = TasteProfileRepository::new(state.pool())
        .save(user.id, name, &req.profile)
        .await?;

    Ok(Json(saved))
}

/// Delete one of the caller's saved profiles.
///
/// DELETE /account/taste-profiles/{id}
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<TasteProfileId>,
) -> Result<StatusCode> {
    let deleted = TasteProfileRepository::new(state.pool())
        .delete(id, user.id)
        .await?;

    if !deleted {
        return Err(AppError::NotFound(format!("taste profile {id}")));
    }

    Ok(StatusCode::NO_CONTENT)
}
