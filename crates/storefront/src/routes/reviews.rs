//! Product review route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use roastline_core::{ProductId, ReviewId};

use crate::db::ReviewRepository;
use crate::db::reviews::Review;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Review submission request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewRequest {
    pub rating: u8,
    pub title: Option<String>,
    pub body: String,
}

/// Review submission response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewResponse {
    pub id: ReviewId,
    pub status: String,
}

/// Approved reviews for a product.
///
/// GET /products/{id}/reviews
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Vec<Review>>> {
    // 404 for unknown or inactive products, same as the product page
    state
        .catalog()
        .product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    let reviews = ReviewRepository::new(state.pool())
        .list_approved_for_product(product_id)
        .await?;

    Ok(Json(reviews))
}

/// Submit a review. It is held for moderation before appearing.
///
/// POST /products/{id}/reviews
#[instrument(skip(state, user, req), fields(user_id = %user.id, product_id = %product_id))]
pub async fn submit(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
    Json(req): Json<SubmitReviewRequest>,
) -> Result<(StatusCode, Json<SubmitReviewResponse>)> {
    if !(1..=5).contains(&req.rating) {
        return Err(AppError::BadRequest(
            "rating must be between 1 and 5".to_string(),
        ));
    }

    let body = req.body.trim();
    if body.is_empty() {
        return Err(AppError::BadRequest("review body is required".to_string()));
    }

    state
        .catalog()
        .product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    let id = ReviewRepository::new(state.pool())
        .submit(user.id, product_id, req.rating, req.title.as_deref(), body)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitReviewResponse {
            id,
            status: "pending".to_string(),
        }),
    ))
}
