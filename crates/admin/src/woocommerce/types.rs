//! Wire types for the WooCommerce REST API.
//!
//! WooCommerce serializes money as strings and timestamps as naive GMT
//! datetimes, so the structs keep the raw representation and expose parse
//! helpers.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product status value WooCommerce uses for live products.
const STATUS_PUBLISH: &str = "publish";

/// A product as returned by `GET /wp-json/wc/v3/products`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WooProduct {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Price as a decimal string; empty for products without one.
    #[serde(default)]
    pub regular_price: String,
    #[serde(default)]
    pub status: String,
}

impl WooProduct {
    /// Parse the price string, treating an empty or malformed value as
    /// absent.
    #[must_use]
    pub fn price(&self) -> Option<Decimal> {
        self.regular_price.trim().parse().ok()
    }

    /// Whether the product is live on the remote store.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == STATUS_PUBLISH
    }
}

/// Body for `POST`/`PUT` against `/wp-json/wc/v3/products`.
#[derive(Debug, Clone, Serialize)]
pub struct WooProductPayload {
    pub name: String,
    #[serde(rename = "type")]
    pub product_type: String,
    pub regular_price: String,
    pub description: String,
    pub status: String,
}

impl WooProductPayload {
    /// Build the payload for one of our catalog products.
    #[must_use]
    pub fn from_local(name: &str, description: &str, price: Decimal, active: bool) -> Self {
        Self {
            name: name.to_owned(),
            product_type: "simple".to_owned(),
            regular_price: price.to_string(),
            description: description.to_owned(),
            status: if active { STATUS_PUBLISH } else { "draft" }.to_owned(),
        }
    }
}

/// An order as returned by `GET /wp-json/wc/v3/orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct WooOrder {
    pub id: i64,
    pub status: String,
    pub currency: String,
    /// Order total as a decimal string.
    pub total: String,
    /// Creation time in GMT without a timezone suffix.
    #[serde(default)]
    pub date_created_gmt: Option<String>,
    #[serde(default)]
    pub billing: WooBilling,
    #[serde(default)]
    pub line_items: Vec<WooLineItem>,
}

impl WooOrder {
    /// Parse the order total, if present and well-formed.
    #[must_use]
    pub fn total_amount(&self) -> Option<Decimal> {
        self.total.trim().parse().ok()
    }

    /// Parse the GMT creation timestamp.
    #[must_use]
    pub fn placed_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.date_created_gmt.as_deref()?;

        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// Billing block on a remote order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WooBilling {
    #[serde(default)]
    pub email: String,
}

/// One line of a remote order.
#[derive(Debug, Clone, Deserialize)]
pub struct WooLineItem {
    pub name: String,
    pub quantity: i32,
    /// Line total as a decimal string.
    #[serde(default)]
    pub total: String,
}

impl WooLineItem {
    /// Parse the line total, if well-formed.
    #[must_use]
    pub fn total_amount(&self) -> Option<Decimal> {
        self.total.trim().parse().ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_price_parses() {
        let product: WooProduct = serde_json::from_str(
            r#"{"id": 12, "name": "Espresso Roast", "regular_price": "14.50", "status": "publish"}"#,
        )
        .unwrap();

        assert_eq!(product.price(), Some(Decimal::new(1450, 2)));
        assert!(product.is_published());
    }

    #[test]
    fn test_product_empty_price_is_none() {
        let product: WooProduct =
            serde_json::from_str(r#"{"id": 12, "name": "Sampler", "regular_price": ""}"#).unwrap();

        assert_eq!(product.price(), None);
        assert!(!product.is_published());
    }

    #[test]
    fn test_payload_status_follows_active_flag() {
        let live = WooProductPayload::from_local("Blend", "", Decimal::new(900, 2), true);
        assert_eq!(live.status, "publish");
        assert_eq!(live.regular_price, "9.00");

        let hidden = WooProductPayload::from_local("Blend", "", Decimal::new(900, 2), false);
        assert_eq!(hidden.status, "draft");
    }

    #[test]
    fn test_order_parses_with_line_items() {
        let order: WooOrder = serde_json::from_str(
            r#"{
                "id": 731,
                "status": "processing",
                "currency": "EUR",
                "total": "29.00",
                "date_created_gmt": "2026-03-22T16:28:02",
                "billing": {"email": "taster@example.com"},
                "line_items": [
                    {"name": "Espresso Roast", "quantity": 2, "total": "29.00"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(order.total_amount(), Some(Decimal::new(2900, 2)));
        assert_eq!(order.billing.email, "taster@example.com");
        assert_eq!(order.line_items[0].total_amount(), Some(Decimal::new(2900, 2)));

        let placed = order.placed_at().unwrap();
        assert_eq!(placed.to_rfc3339(), "2026-03-22T16:28:02+00:00");
    }

    #[test]
    fn test_order_tolerates_missing_optional_fields() {
        let order: WooOrder = serde_json::from_str(
            r#"{"id": 9, "status": "pending", "currency": "USD", "total": "0.00"}"#,
        )
        .unwrap();

        assert!(order.placed_at().is_none());
        assert!(order.billing.email.is_empty());
        assert!(order.line_items.is_empty());
    }
}
