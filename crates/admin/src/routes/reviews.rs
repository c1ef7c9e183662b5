//! Review moderation route handlers.
//!
//! Storefront reviews land in `pending`; nothing reaches the public site
//! until someone approves it here.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use roastline_core::{ReviewId, ReviewStatus};

use crate::db::ReviewRepository;
use crate::db::reviews::Review;
use crate::error::Result;
use crate::middleware::{RequireAdminAuth, RequireWriteAccess};
use crate::state::AppState;

/// Moderation queue query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListQuery {
    pub status: Option<ReviewStatus>,
}

/// List reviews in one status, oldest first. Defaults to the pending queue.
///
/// GET /reviews
#[instrument(skip(_admin, state))]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ReviewListQuery>,
) -> Result<Json<Vec<Review>>> {
    let status = query.status.unwrap_or(ReviewStatus::Pending);

    let reviews = ReviewRepository::new(state.shop_pool())
        .list_by_status(status)
        .await?;

    Ok(Json(reviews))
}

/// Approve a review for the storefront.
///
/// POST /reviews/{id}/approve
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn approve(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
) -> Result<Json<Review>> {
    let review = ReviewRepository::new(state.shop_pool())
        .set_status(id, ReviewStatus::Approved)
        .await?;

    Ok(Json(review))
}

/// Hide a review from the storefront.
///
/// POST /reviews/{id}/hide
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn hide(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
) -> Result<Json<Review>> {
    let review = ReviewRepository::new(state.shop_pool())
        .set_status(id, ReviewStatus::Hidden)
        .await?;

    Ok(Json(review))
}

/// Delete a review outright.
///
/// DELETE /reviews/{id}
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn remove(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
) -> Result<StatusCode> {
    ReviewRepository::new(state.shop_pool()).delete(id).await?;

    tracing::info!(review_id = %id, "Review deleted");

    Ok(StatusCode::NO_CONTENT)
}
