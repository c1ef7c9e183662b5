//! Integration tests for the admin dashboard and order management.
//!
//! Prerequisites:
//! - A running `PostgreSQL` database with migrations applied
//! - The admin server running (cargo run -p roastline-admin)
//! - A seeded admin account with write access (`roastline admin create`),
//!   reachable via `ADMIN_TEST_EMAIL` / `ADMIN_TEST_PASSWORD`
//!
//! The status-flow test advances a real pending order; run against a
//! disposable environment.
//!
//! Run with: cargo test -p roastline-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Base URL for the admin API (configurable via environment).
fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| String::from("http://localhost:3001"))
}

/// Log in with the seeded test admin and return a cookie-holding client.
async fn authenticated_client() -> Client {
    let client = Client::builder()
        .cookie_store(true)
        .build()
        .expect("reqwest client construction failed");

    let base_url = admin_base_url();
    let email =
        std::env::var("ADMIN_TEST_EMAIL").unwrap_or_else(|_| "admin@roastline.test".to_string());
    let password =
        std::env::var("ADMIN_TEST_PASSWORD").unwrap_or_else(|_| "integration-pass-1".to_string());

    let resp = client
        .post(format!("{base_url}/auth/login"))
        .json(&json!({"email": email, "password": password}))
        .send()
        .await
        .expect("Failed to reach admin login");
    assert_eq!(
        resp.status(),
        StatusCode::OK,
        "Admin login failed; seed a test admin first"
    );

    client
}

/// First order currently in the given status, if any.
async fn first_order_with_status(client: &Client, status: &str) -> Option<i64> {
    let base_url = admin_base_url();
    let resp = client
        .get(format!("{base_url}/orders?status={status}"))
        .send()
        .await
        .expect("Failed to list orders");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to decode body as JSON");
    body["orders"]
        .as_array()
        .and_then(|orders| orders.first())
        .and_then(|order| order["id"].as_i64())
}

// ============================================================================
// Dashboard Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and a seeded test admin"]
async fn test_dashboard_stats_shape() {
    let client = authenticated_client().await;
    let base_url = admin_base_url();

    let resp = client
        .get(format!("{base_url}/dashboard/stats"))
        .send()
        .await
        .expect("Failed to get dashboard stats");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to decode body as JSON");

    assert!(body["totalOrders"].as_i64().is_some());
    assert!(body["revenue"].as_str().is_some());
    assert!(body["statusBreakdown"].is_array());
    assert!(body["customers"].as_i64().is_some());
    assert!(body["pendingReviews"].as_i64().is_some());
    assert!(body["recentOrders"].is_array());
}

// ============================================================================
// Order Listing Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and a seeded test admin"]
async fn test_order_list_status_filter() {
    let client = authenticated_client().await;
    let base_url = admin_base_url();

    let resp = client
        .get(format!("{base_url}/orders?status=pending"))
        .send()
        .await
        .expect("Failed to list orders");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to decode body as JSON");

    for order in body["orders"].as_array().expect("orders array") {
        assert_eq!(order["status"], "pending");
    }
}

#[tokio::test]
#[ignore = "Requires running admin server and a seeded test admin"]
async fn test_unknown_order_returns_404() {
    let client = authenticated_client().await;
    let base_url = admin_base_url();

    let resp = client
        .get(format!("{base_url}/orders/99999999"))
        .send()
        .await
        .expect("Failed to get order");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running admin server and a seeded test admin"]
async fn test_order_detail_includes_items() {
    let client = authenticated_client().await;
    let base_url = admin_base_url();

    let Some(id) = first_order_with_status(&client, "pending").await else {
        return; // No pending orders in this environment
    };

    let resp = client
        .get(format!("{base_url}/orders/{id}"))
        .send()
        .await
        .expect("Failed to get order detail");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to decode body as JSON");

    assert_eq!(body["id"].as_i64(), Some(id));
    let items = body["items"].as_array().expect("items array");
    for item in items {
        assert!(item["quantity"].as_i64().is_some_and(|q| q > 0));
        assert!(item["unitPrice"]["amount"].as_str().is_some());
    }
}

// ============================================================================
// Status Flow Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server, a seeded test admin and a pending order"]
async fn test_order_status_flow() {
    let client = authenticated_client().await;
    let base_url = admin_base_url();

    let Some(id) = first_order_with_status(&client, "pending").await else {
        return; // No pending orders to advance
    };

    // Skipping ahead in the lifecycle is rejected
    let resp = client
        .post(format!("{base_url}/orders/{id}/status"))
        .json(&json!({"status": "shipped"}))
        .send()
        .await
        .expect("Failed to send status update");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // The forward step works
    let resp = client
        .post(format!("{base_url}/orders/{id}/status"))
        .json(&json!({"status": "paid"}))
        .send()
        .await
        .expect("Failed to send status update");
    assert_eq!(resp.status(), StatusCode::OK);
    let order: Value = resp.json().await.expect("Failed to decode body as JSON");
    assert_eq!(order["status"], "paid");

    // Cancel from a non-terminal status
    let resp = client
        .post(format!("{base_url}/orders/{id}/cancel"))
        .send()
        .await
        .expect("Failed to cancel order");
    assert_eq!(resp.status(), StatusCode::OK);
    let order: Value = resp.json().await.expect("Failed to decode body as JSON");
    assert_eq!(order["status"], "cancelled");

    // Cancelled is terminal
    let resp = client
        .post(format!("{base_url}/orders/{id}/status"))
        .json(&json!({"status": "paid"}))
        .send()
        .await
        .expect("Failed to send status update");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
