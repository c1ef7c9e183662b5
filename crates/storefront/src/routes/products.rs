//! Public catalog endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use roastline_core::ProductId;

use crate::db::products::Product;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Default page size for the catalog.
const DEFAULT_PER_PAGE: i64 = 24;

/// Maximum page size for the catalog.
const MAX_PER_PAGE: i64 = 100;

/// `?page=` / `?perPage=` query string.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Paginated catalog response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// List active products.
///
/// GET /products
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<ProductListResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);
    let offset = (page - 1) * per_page;

    let result = state.catalog().products(per_page, offset).await?;

    Ok(Json(ProductListResponse {
        products: result.products,
        total: result.total,
        page,
        per_page,
    }))
}

/// Get a single active product.
///
/// GET /products/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = state
        .catalog()
        .product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(product))
}
