//! Session cart endpoints.
//!
//! The cart is held in the session: a list of blend lines, each pairing a
//! taste profile with a quantity and the unit price captured when the line
//! was created. Adding a blend that matches an existing line field-for-field
//! bumps that line's quantity instead of appending.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use roastline_core::{Price, TasteProfile};

use crate::error::{AppError, Result};
use crate::models::cart::{Cart, CartLine};
use crate::models::session_keys;
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Add to cart request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub profile: TasteProfile,
    pub quantity: Option<u32>,
}

/// Update cart line request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    pub index: usize,
    pub quantity: u32,
}

/// Remove cart line request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
    pub index: usize,
}

/// One cart line as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub index: usize,
    pub profile: TasteProfile,
    pub quantity: u32,
    pub unit_price: Price,
    pub line_price: Price,
}

/// Cart view returned by all cart endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub lines: Vec<CartLineView>,
    pub item_count: u32,
    pub subtotal: Price,
}

/// Cart count badge response.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

fn line_view(index: usize, line: &CartLine) -> CartLineView {
    CartLineView {
        index,
        profile: line.profile.clone(),
        quantity: line.quantity,
        unit_price: line.unit_price,
        line_price: line.line_total(),
    }
}

fn summarize(cart: &Cart, state: &AppState) -> CartSummary {
    let currency = cart
        .lines
        .first()
        .map_or(state.config().currency, |line| {
            line.unit_price.currency_code
        });

    CartSummary {
        lines: cart
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| line_view(i, line))
            .collect(),
        item_count: cart.item_count(),
        subtotal: Price::new(cart.subtotal(), currency),
    }
}

// =============================================================================
// Cart session plumbing
// =============================================================================

/// Get the cart from the session, or an empty one.
pub async fn get_cart(session: &Session) -> Cart {
    session
        .get::<Cart>(session_keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Persist the cart to the session.
async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session
        .insert(session_keys::CART, cart)
        .await
        .map_err(|e| AppError::Internal(format!("failed to save cart to session: {e}")))
}

/// Remove the cart from the session.
pub async fn clear_cart(session: &Session) -> Result<()> {
    session
        .remove::<Cart>(session_keys::CART)
        .await
        .map_err(|e| AppError::Internal(format!("failed to clear cart from session: {e}")))?;
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// Current cart view.
///
/// GET /cart
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartSummary>> {
    let cart = get_cart(&session).await;
    Ok(Json(summarize(&cart, &state)))
}

/// Add a blend to the cart.
///
/// POST /cart/add
///
/// If an existing line's profile equals the submitted one field-for-field,
/// that line's quantity is incremented; otherwise a new line is appended at
/// the current unit price from the active pricing row.
#[instrument(skip(state, session, req))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<AddToCartRequest>,
) -> Result<Json<CartSummary>> {
    let quantity = req.quantity.unwrap_or(1).max(1);

    let pricing = state
        .catalog()
        .active_pricing()
        .await?
        .ok_or_else(|| AppError::Internal("no active pricing configured".to_string()))?;

    let mut cart = get_cart(&session).await;
    cart.add(req.profile, quantity, pricing.unit_price);
    save_cart(&session, &cart).await?;

    crate::error::add_breadcrumb("cart", "Added blend to cart", None);

    Ok(Json(summarize(&cart, &state)))
}

/// Set a cart line's quantity. Quantity 0 removes the line.
///
/// POST /cart/update
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<UpdateCartRequest>,
) -> Result<Json<CartSummary>> {
    let mut cart = get_cart(&session).await;

    if !cart.set_quantity(req.index, req.quantity) {
        return Err(AppError::NotFound(format!("cart line {}", req.index)));
    }

    save_cart(&session, &cart).await?;

    Ok(Json(summarize(&cart, &state)))
}

/// Remove a cart line by index.
///
/// POST /cart/remove
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<RemoveFromCartRequest>,
) -> Result<Json<CartSummary>> {
    let mut cart = get_cart(&session).await;

    if !cart.remove(req.index) {
        return Err(AppError::NotFound(format!("cart line {}", req.index)));
    }

    save_cart(&session, &cart).await?;

    Ok(Json(summarize(&cart, &state)))
}

/// Total item quantity for the cart badge.
///
/// GET /cart/count
#[instrument(skip(session))]
pub async fn count(session: Session) -> Json<CartCount> {
    let cart = get_cart(&session).await;
    Json(CartCount {
        count: cart.item_count(),
    })
}

/// Empty the cart.
///
/// POST /cart/clear
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Json<CartSummary>> {
    clear_cart(&session).await?;
    Ok(Json(summarize(&Cart::default(), &state)))
}
