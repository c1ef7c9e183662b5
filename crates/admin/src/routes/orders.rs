//! Order management route handlers.
//!
//! Status changes go through [`OrderStatus::can_transition_to`], so the
//! fulfillment chain only moves forward and terminal orders stay put.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use roastline_core::{OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::db::orders::{Order, OrderItem};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdminAuth, RequireWriteAccess};
use crate::state::AppState;

/// Default page size for the order listing.
const DEFAULT_PER_PAGE: i64 = 25;

/// Maximum page size for the order listing.
const MAX_PER_PAGE: i64 = 100;

/// Listing query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Paginated order listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub page: i64,
    pub per_page: i64,
}

/// Order detail with line items.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailResponse {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Status change request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// List orders newest first, optionally filtered by status.
///
/// GET /orders
#[instrument(skip(_admin, state))]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<OrderListResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);
    let offset = (page - 1) * per_page;

    let orders = OrderRepository::new(state.shop_pool())
        .list(query.status, per_page, offset)
        .await?;

    Ok(Json(OrderListResponse {
        orders,
        page,
        per_page,
    }))
}

/// Order detail with line items.
///
/// GET /orders/{id}
#[instrument(skip(_admin, state))]
pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetailResponse>> {
    let (order, items) = OrderRepository::new(state.shop_pool())
        .get_with_items(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(Json(OrderDetailResponse { order, items }))
}

/// Move an order along the fulfillment chain.
///
/// POST /orders/{id}/status
#[instrument(skip(admin, state, req), fields(admin_id = %admin.id))]
pub async fn update_status(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    set_status(&state, id, req.status).await
}

/// Cancel a non-terminal order.
///
/// POST /orders/{id}/cancel
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn cancel(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    set_status(&state, id, OrderStatus::Cancelled).await
}

/// Validate the transition against the current status, then apply it.
async fn set_status(state: &AppState, id: OrderId, next: OrderStatus) -> Result<Json<Order>> {
    let repo = OrderRepository::new(state.shop_pool());

    let (order, _) = repo
        .get_with_items(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    if !order.status.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "cannot move order from {} to {next}",
            order.status
        )));
    }

    let updated = repo.update_status(id, next).await?;

    tracing::info!(order_id = %id, from = %order.status, to = %next, "Order status changed");

    Ok(Json(updated))
}
