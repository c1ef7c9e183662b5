//! Product management route handlers.
//!
//! Unlike the storefront catalog these endpoints see inactive products
//! too; activation is the switch that publishes a product.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use roastline_core::{CurrencyCode, Price, ProductId};
use rust_decimal::Decimal;

use crate::db::CatalogRepository;
use crate::db::catalog::{NewProduct, Product, ProductChanges};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdminAuth, RequireWriteAccess};
use crate::state::AppState;

/// Create request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub origin: Option<String>,
    pub price: Decimal,
    pub currency: Option<String>,
    pub image_url: Option<String>,
}

/// Partial update request; absent fields keep their value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub origin: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
}

/// Parse the optional currency field, falling back to the configured one.
fn resolve_currency(state: &AppState, currency: Option<&str>) -> Result<CurrencyCode> {
    currency.map_or_else(
        || Ok(state.config().currency),
        |c| {
            c.parse()
                .map_err(|e: String| AppError::BadRequest(format!("invalid currency: {e}")))
        },
    )
}

/// List the whole catalog, inactive products included.
///
/// GET /products
#[instrument(skip(_admin, state))]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>> {
    let products = CatalogRepository::new(state.shop_pool()).list_all().await?;

    Ok(Json(products))
}

/// Product detail.
///
/// GET /products/{id}
#[instrument(skip(_admin, state))]
pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = CatalogRepository::new(state.shop_pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(product))
}

/// Create a product. New products start inactive.
///
/// POST /products
#[instrument(skip(admin, state, req), fields(admin_id = %admin.id))]
pub async fn create(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("product name is required".to_string()));
    }

    let currency = resolve_currency(&state, req.currency.as_deref())?;

    let product = CatalogRepository::new(state.shop_pool())
        .create(&NewProduct {
            name: req.name,
            description: req.description,
            origin: req.origin,
            price: Price::new(req.price, currency),
            image_url: req.image_url,
        })
        .await?;

    tracing::info!(product_id = %product.id, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product's editable fields.
///
/// PUT /products/{id}
#[instrument(skip(admin, state, req), fields(admin_id = %admin.id))]
pub async fn update(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    if let Some(name) = &req.name
        && name.trim().is_empty()
    {
        return Err(AppError::BadRequest("product name cannot be empty".to_string()));
    }

    let price = req
        .price
        .map(|amount| Price::new(amount, state.config().currency));

    let product = CatalogRepository::new(state.shop_pool())
        .update(
            id,
            &ProductChanges {
                name: req.name,
                description: req.description,
                origin: req.origin,
                price,
                image_url: req.image_url,
            },
        )
        .await?;

    Ok(Json(product))
}

/// Publish a product to the storefront.
///
/// POST /products/{id}/activate
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn activate(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = CatalogRepository::new(state.shop_pool())
        .set_active(id, true)
        .await?;

    Ok(Json(product))
}

/// Hide a product from the storefront.
///
/// POST /products/{id}/deactivate
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn deactivate(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = CatalogRepository::new(state.shop_pool())
        .set_active(id, false)
        .await?;

    Ok(Json(product))
}

/// Remove a product outright.
///
/// DELETE /products/{id}
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn remove(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    CatalogRepository::new(state.shop_pool()).delete(id).await?;

    tracing::info!(product_id = %id, "Product deleted");

    Ok(StatusCode::NO_CONTENT)
}
