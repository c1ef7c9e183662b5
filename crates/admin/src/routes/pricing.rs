//! Blend pricing route handlers.
//!
//! The storefront prices custom blends off the single active row;
//! activating a row atomically retires the previous one.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use roastline_core::{Price, PricingId};

use crate::db::PricingRepository;
use crate::db::pricing::Pricing;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdminAuth, RequireWriteAccess};
use crate::state::AppState;

/// Create request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePricingRequest {
    pub name: String,
    /// Price per gram.
    pub unit_price: Decimal,
}

/// Partial update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePricingRequest {
    pub name: Option<String>,
    pub unit_price: Option<Decimal>,
}

/// List pricing rows, newest first.
///
/// GET /pricing
#[instrument(skip(_admin, state))]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Pricing>>> {
    let rows = PricingRepository::new(state.shop_pool()).list_all().await?;

    Ok(Json(rows))
}

/// Create a pricing row. New rows start inactive.
///
/// POST /pricing
#[instrument(skip(admin, state, req), fields(admin_id = %admin.id))]
pub async fn create(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Json(req): Json<CreatePricingRequest>,
) -> Result<(StatusCode, Json<Pricing>)> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("pricing name is required".to_string()));
    }
    if req.unit_price <= Decimal::ZERO {
        return Err(AppError::BadRequest(
            "unit price must be positive".to_string(),
        ));
    }

    let row = PricingRepository::new(state.shop_pool())
        .create(
            &req.name,
            Price::new(req.unit_price, state.config().currency),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// Rename or reprice a row.
///
/// PATCH /pricing/{id}
#[instrument(skip(admin, state, req), fields(admin_id = %admin.id))]
pub async fn update(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<PricingId>,
    Json(req): Json<UpdatePricingRequest>,
) -> Result<Json<Pricing>> {
    if let Some(unit_price) = req.unit_price
        && unit_price <= Decimal::ZERO
    {
        return Err(AppError::BadRequest(
            "unit price must be positive".to_string(),
        ));
    }

    let unit_price = req
        .unit_price
        .map(|amount| Price::new(amount, state.config().currency));

    let row = PricingRepository::new(state.shop_pool())
        .update(id, req.name.as_deref(), unit_price)
        .await?;

    Ok(Json(row))
}

/// Make a row the single active one.
///
/// POST /pricing/{id}/activate
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn activate(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<PricingId>,
) -> Result<Json<Pricing>> {
    let row = PricingRepository::new(state.shop_pool())
        .activate(id)
        .await?;

    tracing::info!(pricing_id = %id, "Pricing row activated");

    Ok(Json(row))
}
