//! Checkout route handler.

use axum::{Json, extract::State};
use tower_sessions::Session;
use tracing::instrument;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::routes::account::OrderDetailResponse;
use crate::routes::cart::{clear_cart, get_cart};
use crate::state::AppState;

/// Place an order from the session cart.
///
/// POST /checkout
///
/// Requires auth and a non-empty cart. The order and its items (blend
/// snapshot, unit price and quantity copied from the cart) are created in
/// one transaction with a server-computed total, then the cart is cleared.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Json<OrderDetailResponse>> {
    let cart = get_cart(&session).await;

    if cart.is_empty() {
        return Err(AppError::BadRequest("cart is empty".to_string()));
    }

    let repo = OrderRepository::new(state.pool());
    let order = repo
        .create_from_cart(user.id, &cart, state.config().currency)
        .await?;

    clear_cart(&session).await?;

    crate::error::add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_id", &order.id.to_string())]),
    );

    let (order, items) = repo
        .get_for_user(order.id, user.id)
        .await?
        .ok_or_else(|| AppError::Internal("order vanished after checkout".to_string()))?;

    Ok(Json(OrderDetailResponse { order, items }))
}
