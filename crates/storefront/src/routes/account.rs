//! Profile and order-history endpoints under `/account`.
//!
//! Every handler here requires a signed-in customer.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use roastline_core::OrderId;

use crate::db::orders::{Order, OrderItem};
use crate::db::users::UserRepository;
use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::user::User;
use crate::state::AppState;

/// An order with its line items.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailResponse {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Profile update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub marketing_opt_in: bool,
}

/// List the caller's orders, newest first.
///
/// GET /account/orders
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(Json(orders))
}

/// Order detail with items. 404 for other users' orders.
///
/// GET /account/orders/{id}
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn order_detail(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetailResponse>> {
    let (order, items) = OrderRepository::new(state.pool())
        .get_for_user(id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(Json(OrderDetailResponse { order, items }))
}

/// The caller's profile.
///
/// GET /account/profile
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<User>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("account".to_string()))?;

    Ok(Json(user))
}

/// Update display name and marketing opt-in.
///
/// PATCH /account/profile
#[instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<User>> {
    let updated = UserRepository::new(state.pool())
        .update_profile(user.id, req.display_name.as_deref(), req.marketing_opt_in)
        .await?;

    Ok(Json(updated))
}
