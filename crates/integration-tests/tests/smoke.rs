//! Smoke tests against a running server.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`bh-cli migrate`)
//! - The server running (`cargo run -p bakehouse-server`)
//!
//! Run with: `cargo test -p bakehouse-integration-tests -- --ignored`

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use bakehouse_integration_tests::live_base_url;

#[tokio::test]
#[ignore = "Requires a running server"]
async fn test_live_health() {
    let client = Client::new();
    let base_url = live_base_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to reach server");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .expect("Failed to reach server");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires a running server"]
async fn test_live_menu_is_public() {
    let resp = Client::new()
        .get(format!("{}/api/v1/user/menu", live_base_url()))
        .send()
        .await
        .expect("Failed to reach server");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Menu was not JSON");
    assert!(body["products"].is_array());
}

#[tokio::test]
#[ignore = "Requires a running server"]
async fn test_live_orders_need_token() {
    let resp = Client::new()
        .post(format!("{}/api/v1/user/place-order", live_base_url()))
        .json(&json!({ "items": [], "totalAmount": 0 }))
        .send()
        .await
        .expect("Failed to reach server");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = resp.json().await.expect("Error was not JSON");
    assert_eq!(body["msg"], "No token, access denied");
}
