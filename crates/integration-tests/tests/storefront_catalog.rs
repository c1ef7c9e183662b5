//! Integration tests for the storefront catalog and cart.
//!
//! Prerequisites:
//! - A running `PostgreSQL` database with migrations applied
//! - The storefront server running (cargo run -p roastline-storefront)
//! - An active pricing row for the cart tests (seed one via the admin API)
//!
//! Run with: cargo test -p roastline-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde_json::Value;

use roastline_core::{GrindType, RoastLevel, TasteProfile, TasteScore};

/// Base URL for the storefront API (configurable via environment).
fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| String::from("http://localhost:3000"))
}

/// A client that holds session cookies, like a browser would.
fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("reqwest client construction failed")
}

/// A blend customization to put in the cart.
fn test_blend(bitterness: u8, flavour: &str) -> TasteProfile {
    TasteProfile {
        bitterness: TasteScore::new(bitterness).expect("valid score"),
        acidity: TasteScore::new(3).expect("valid score"),
        body: TasteScore::new(4).expect("valid score"),
        flavour: flavour.to_owned(),
        roast_level: RoastLevel::Medium,
        grind_type: GrindType::Espresso,
    }
}

/// Read a string-encoded price amount out of a JSON body.
fn amount(value: &Value) -> Decimal {
    value["amount"]
        .as_str()
        .expect("price amount should be a string")
        .parse()
        .expect("price amount should be a decimal")
}

// ============================================================================
// Health Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_health_endpoints() {
    let client = session_client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to reach health endpoint");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .expect("Failed to reach readiness endpoint");
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Catalog Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_product_list_shape() {
    let client = session_client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/products"))
        .send()
        .await
        .expect("Failed to get product list");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to decode body as JSON");

    let products = body["products"].as_array().expect("products array");
    assert!(body["total"].as_i64().is_some());
    assert_eq!(body["page"], 1);

    for product in products {
        assert!(product["id"].as_i64().is_some());
        assert!(product["name"].as_str().is_some());
        assert!(product["price"]["amount"].as_str().is_some());
    }
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_product_list_clamps_pagination() {
    let client = session_client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/products?page=0&perPage=100000"))
        .send()
        .await
        .expect("Failed to get product list");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to decode body as JSON");

    assert_eq!(body["page"], 1);
    assert_eq!(body["perPage"], 100);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_unknown_product_returns_404() {
    let client = session_client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/products/99999999"))
        .send()
        .await
        .expect("Failed to get product");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("Failed to decode body as JSON");
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_product_reviews_listing() {
    let client = session_client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/products"))
        .send()
        .await
        .expect("Failed to get product list");
    let body: Value = resp.json().await.expect("Failed to decode body as JSON");

    let Some(product) = body["products"].as_array().and_then(|p| p.first()) else {
        return; // Empty catalog in this environment
    };
    let product_id = product["id"].as_i64().expect("product id");

    let resp = client
        .get(format!("{base_url}/products/{product_id}/reviews"))
        .send()
        .await
        .expect("Failed to get reviews");

    assert_eq!(resp.status(), StatusCode::OK);
    let reviews: Value = resp.json().await.expect("Failed to decode body as JSON");

    // Only approved reviews are exposed here
    for review in reviews.as_array().expect("reviews array") {
        assert!(review["rating"].as_i64().is_some_and(|r| (1..=5).contains(&r)));
    }
}

// ============================================================================
// Cart Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and an active pricing row"]
async fn test_cart_starts_empty() {
    let client = session_client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to get cart");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to decode body as JSON");

    assert_eq!(body["itemCount"], 0);
    assert_eq!(body["lines"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running storefront server and an active pricing row"]
async fn test_cart_merges_identical_blends() {
    let client = session_client();
    let base_url = storefront_base_url();

    let blend = test_blend(2, "fruity");

    let resp = client
        .post(format!("{base_url}/cart/add"))
        .json(&serde_json::json!({"profile": blend, "quantity": 2}))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(
        resp.status(),
        StatusCode::OK,
        "Cart add failed; is a pricing row active?"
    );

    // Same blend again merges into the existing line
    let resp = client
        .post(format!("{base_url}/cart/add"))
        .json(&serde_json::json!({"profile": blend, "quantity": 1}))
        .send()
        .await
        .expect("Failed to add to cart");
    let body: Value = resp.json().await.expect("Failed to decode body as JSON");

    let lines = body["lines"].as_array().expect("lines array");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 3);
    assert_eq!(body["itemCount"], 3);

    // A different blend gets its own line
    let resp = client
        .post(format!("{base_url}/cart/add"))
        .json(&serde_json::json!({"profile": test_blend(5, "smoky"), "quantity": 1}))
        .send()
        .await
        .expect("Failed to add to cart");
    let body: Value = resp.json().await.expect("Failed to decode body as JSON");
    assert_eq!(body["lines"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["itemCount"], 4);
}

#[tokio::test]
#[ignore = "Requires running storefront server and an active pricing row"]
async fn test_cart_prices_lines_from_unit_price() {
    let client = session_client();
    let base_url = storefront_base_url();

    let resp = client
        .post(format!("{base_url}/cart/add"))
        .json(&serde_json::json!({"profile": test_blend(3, "nutty"), "quantity": 2}))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to decode body as JSON");

    let line = &body["lines"][0];
    let unit = amount(&line["unitPrice"]);
    let line_total = amount(&line["linePrice"]);
    let subtotal = amount(&body["subtotal"]);

    assert!(unit > Decimal::ZERO);
    assert_eq!(line_total, unit * Decimal::from(2));
    assert_eq!(subtotal, line_total);
}

#[tokio::test]
#[ignore = "Requires running storefront server and an active pricing row"]
async fn test_cart_update_remove_clear() {
    let client = session_client();
    let base_url = storefront_base_url();

    let resp = client
        .post(format!("{base_url}/cart/add"))
        .json(&serde_json::json!({"profile": test_blend(1, "floral"), "quantity": 5}))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);

    // Shrink the line
    let resp = client
        .post(format!("{base_url}/cart/update"))
        .json(&serde_json::json!({"index": 0, "quantity": 1}))
        .send()
        .await
        .expect("Failed to update cart");
    let body: Value = resp.json().await.expect("Failed to decode body as JSON");
    assert_eq!(body["itemCount"], 1);

    // Count badge agrees
    let resp = client
        .get(format!("{base_url}/cart/count"))
        .send()
        .await
        .expect("Failed to get cart count");
    let body: Value = resp.json().await.expect("Failed to decode body as JSON");
    assert_eq!(body["count"], 1);

    // Updating a line that doesn't exist is a 404
    let resp = client
        .post(format!("{base_url}/cart/update"))
        .json(&serde_json::json!({"index": 7, "quantity": 1}))
        .send()
        .await
        .expect("Failed to update cart");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Remove and clear
    let resp = client
        .post(format!("{base_url}/cart/remove"))
        .json(&serde_json::json!({"index": 0}))
        .send()
        .await
        .expect("Failed to remove cart line");
    let body: Value = resp.json().await.expect("Failed to decode body as JSON");
    assert_eq!(body["itemCount"], 0);

    let resp = client
        .post(format!("{base_url}/cart/clear"))
        .send()
        .await
        .expect("Failed to clear cart");
    assert_eq!(resp.status(), StatusCode::OK);
}
