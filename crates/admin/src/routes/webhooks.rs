//! WooCommerce webhook handler.
//!
//! WooCommerce signs each delivery with base64 HMAC-SHA256 over the raw
//! body. The signature is checked in constant time before the body is
//! even parsed; unsigned or tampered deliveries change nothing.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use serde::Deserialize;
use sha2::Sha256;
use tracing::instrument;

use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::woocommerce::WooProduct;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the base64 HMAC-SHA256 signature of the raw body.
const SIGNATURE_HEADER: &str = "x-wc-webhook-signature";

/// Header naming the event, e.g. `product.updated`.
const TOPIC_HEADER: &str = "x-wc-webhook-topic";

/// Payload of a `product.deleted` delivery; only the ID is reliable.
#[derive(Debug, Deserialize)]
struct DeletedProduct {
    id: i64,
}

/// Verify a delivery signature against the shared secret.
fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(signature) = STANDARD.decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);

    mac.verify_slice(&signature).is_ok()
}

/// Apply a signed product webhook.
///
/// POST /webhooks/woocommerce
#[instrument(skip(state, headers, body))]
pub async fn woocommerce(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing webhook signature".to_string()))?;

    let secret = state.config().woocommerce.webhook_secret.expose_secret();
    if !verify_signature(secret, &body, signature) {
        return Err(AppError::Unauthorized(
            "invalid webhook signature".to_string(),
        ));
    }

    let topic = headers
        .get(TOPIC_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("missing webhook topic".to_string()))?;

    match topic {
        "product.created" | "product.updated" => {
            let product: WooProduct = serde_json::from_slice(&body)
                .map_err(|e| AppError::BadRequest(format!("malformed product payload: {e}")))?;
            upsert_product(&state, &product).await?;
        }
        "product.deleted" => {
            let deleted: DeletedProduct = serde_json::from_slice(&body)
                .map_err(|e| AppError::BadRequest(format!("malformed product payload: {e}")))?;
            let removed = CatalogRepository::new(state.shop_pool())
                .delete_by_woo_id(deleted.id)
                .await?;
            tracing::info!(woo_id = deleted.id, removed, "Webhook product delete");
        }
        other => {
            // Deliveries for topics we don't track are acknowledged as-is
            tracing::debug!(topic = other, "Ignoring webhook topic");
        }
    }

    Ok(StatusCode::OK)
}

/// Fold one remote product into the catalog, the same way a pull does:
/// match by stored remote ID, then by name, then insert.
async fn upsert_product(state: &AppState, product: &WooProduct) -> Result<()> {
    let catalog = CatalogRepository::new(state.shop_pool());

    if let Some(existing) = catalog.get_by_woo_id(product.id).await? {
        catalog
            .sync_from_remote(
                existing.id,
                product.id,
                &product.name,
                &product.description,
                product.price(),
            )
            .await?;
        tracing::info!(woo_id = product.id, product_id = %existing.id, "Webhook product update");
        return Ok(());
    }

    if let Some(existing) = catalog.find_by_name_ci(&product.name).await?
        && existing.woo_id.is_none()
    {
        catalog
            .sync_from_remote(
                existing.id,
                product.id,
                &product.name,
                &product.description,
                product.price(),
            )
            .await?;
        tracing::info!(woo_id = product.id, product_id = %existing.id, "Webhook product linked");
        return Ok(());
    }

    let Some(price) = product.price() else {
        tracing::info!(woo_id = product.id, "Ignoring webhook product without a price");
        return Ok(());
    };

    let created = catalog
        .insert_from_remote(
            product.id,
            &product.name,
            &product.description,
            price,
            state.config().currency,
            product.is_published(),
        )
        .await?;
    tracing::info!(woo_id = product.id, product_id = %created.id, "Webhook product created");

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        STANDARD.encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature_passes() {
        let body = br#"{"id": 42, "name": "Espresso Roast"}"#;
        let signature = sign("hook-secret", body);

        assert!(verify_signature("hook-secret", body, &signature));
    }

    #[test]
    fn test_tampered_body_fails() {
        let signature = sign("hook-secret", b"original body");

        assert!(!verify_signature("hook-secret", b"tampered body", &signature));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let body = b"payload";
        let signature = sign("hook-secret", body);

        assert!(!verify_signature("other-secret", body, &signature));
    }

    #[test]
    fn test_garbage_base64_fails() {
        assert!(!verify_signature("hook-secret", b"payload", "%%% not base64 %%%"));
    }
}
