//! Integration tests for WooCommerce sync endpoints and webhook auth.
//!
//! Prerequisites:
//! - A running `PostgreSQL` database with migrations applied
//! - The admin server running (cargo run -p roastline-admin)
//! - A seeded admin account with write access (`roastline admin create`)
//! - WooCommerce credentials in the server's environment for the pull test
//!   (without them the pull records a failed run, which is also asserted)
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

// ============================================================================
// Run History Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and a seeded test admin"]
async fn test_sync_runs_listing() {
    let client = authenticated_client().await;
    let base_url = admin_base_url();

    let resp = client
        .get(format!("{base_url}/sync/woocommerce/runs"))
        .send()
        .await
        .expect("Failed to list sync runs");

    assert_eq!(resp.status(), StatusCode::OK);
    let runs: Value = resp.json().await.expect("Failed to decode body as JSON");

    for run in runs.as_array().expect("runs array") {
        assert!(run["direction"].as_str().is_some());
        assert!(run["status"].as_str().is_some());
        assert!(run["created"].as_i64().is_some());
        assert!(run["failed"].as_i64().is_some());
    }
}

#[tokio::test]
#[ignore = "Requires running admin server, a seeded test admin and WooCommerce credentials"]
async fn test_pull_records_a_run() {
    let client = authenticated_client().await;
    let base_url = admin_base_url();

    let resp = client
        .post(format!("{base_url}/sync/woocommerce/pull"))
        .send()
        .await
        .expect("Failed to trigger pull");

    // With reachable credentials the run body comes back directly; without
    // them the endpoint is a 502 and the failure is still recorded
    assert!(
        resp.status() == StatusCode::OK || resp.status() == StatusCode::BAD_GATEWAY,
        "Unexpected status: {}",
        resp.status()
    );

    if resp.status() == StatusCode::OK {
        let run: Value = resp.json().await.expect("Failed to decode body as JSON");
        assert_eq!(run["direction"], "pull");
        assert_ne!(run["status"], "running");
    }

    // Either way the run history grew
    let resp = client
        .get(format!("{base_url}/sync/woocommerce/runs"))
        .send()
        .await
        .expect("Failed to list sync runs");
    let runs: Value = resp.json().await.expect("Failed to decode body as JSON");
    let latest = runs
        .as_array()
        .and_then(|r| r.first())
        .expect("at least one run after a pull");
    assert_eq!(latest["direction"], "pull");
}

#[tokio::test]
#[ignore = "Requires running admin server and a seeded test admin"]
async fn test_sync_requires_session() {
    let base_url = admin_base_url();

    let resp = Client::new()
        .post(format!("{base_url}/sync/woocommerce/pull"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Webhook Auth Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_webhook_rejects_missing_signature() {
    let base_url = admin_base_url();

    let resp = Client::new()
        .post(format!("{base_url}/webhooks/woocommerce"))
        .header("x-wc-webhook-topic", "product.updated")
        .json(&json!({"id": 1, "name": "Spoofed", "status": "publish"}))
        .send()
        .await
        .expect("Failed to send webhook");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_webhook_rejects_invalid_signature() {
    let base_url = admin_base_url();

    let resp = Client::new()
        .post(format!("{base_url}/webhooks/woocommerce"))
        .header("x-wc-webhook-topic", "product.updated")
        .header("x-wc-webhook-signature", "bm90IGEgcmVhbCBzaWduYXR1cmU=")
        .json(&json!({"id": 1, "name": "Spoofed", "status": "publish"}))
        .send()
        .await
        .expect("Failed to send webhook");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
