//! Order placement, the kitchen board and analytics, end to end.

use axum::http::StatusCode;
use serde_json::{Value, json};

use bakehouse_core::{Email, TransitionPolicy};
use bakehouse_integration_tests::TestApp;
use bakehouse_server::db::UserStore;

fn two_item_order() -> Value {
    json!({
        "items": [
            {"name": "Paneer Puff", "price": 100, "quantity": 2},
            {"name": "Masala Chai", "price": 50, "quantity": 1}
        ],
        "totalAmount": 250,
        "address": "Flat 2B, Shivaji Nagar, Pune"
    })
}

async fn place(app: &TestApp, token: &str, order: Value) -> i64 {
    let (status, body) = app
        .post("/api/v1/user/place-order", order, Some(token))
        .await;
    assert_eq!(status, StatusCode::OK, "place-order failed: {body}");
    body["orderId"].as_i64().unwrap()
}

#[tokio::test]
async fn test_place_order_and_deliver_directly() {
    let app = TestApp::new();
    let customer = app.customer("Asha Verma", "a@x.com", "9876543210").await;
    let admin = app.admin("manager@bakers.in").await;

    let order_id = place(&app, &customer, two_item_order()).await;

    let (_, body) = app.get("/api/v1/user/orders", Some(&customer)).await;
    let order = &body["orders"][0];
    assert_eq!(order["id"].as_i64().unwrap(), order_id);
    assert_eq!(order["status"], "Order Placed");
    assert_eq!(order["items"].as_array().unwrap().len(), 2);

    // Skipping straight to Delivered is allowed by default
    let (status, body) = app
        .put(
            &format!("/api/v1/admin/order-status/{order_id}"),
            json!({ "status": "Delivered" }),
            Some(&admin),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "Delivered");

    // and so is reopening it
    let (status, _) = app
        .put(
            &format!("/api/v1/admin/order-status/{order_id}"),
            json!({ "status": "Preparing" }),
            Some(&admin),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_order_validation() {
    let app = TestApp::new();
    let customer = app.customer("Asha Verma", "a@x.com", "9876543210").await;

    let mut mismatch = two_item_order();
    mismatch["totalAmount"] = json!(200);
    let (status, _) = app
        .post("/api/v1/user/place-order", mismatch, Some(&customer))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut zero = two_item_order();
    zero["totalAmount"] = json!(0);
    let (status, _) = app
        .post("/api/v1/user/place-order", zero, Some(&customer))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let empty = json!({ "items": [], "totalAmount": 100, "address": "Pune" });
    let (status, _) = app
        .post("/api/v1/user/place-order", empty, Some(&customer))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let overflowing = json!({
        "items": [{"name": "Wedding Cake", "price": "79228162514264337593543950335", "quantity": 2}],
        "totalAmount": 1,
        "address": "Pune"
    });
    let (status, body) = app
        .post("/api/v1/user/place-order", overflowing, Some(&customer))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");

    let (status, _) = app
        .post("/api/v1/user/place-order", two_item_order(), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unavailable_items_can_still_be_ordered() {
    let app = TestApp::new();
    let admin = app.admin("manager@bakers.in").await;
    let customer = app.customer("Asha Verma", "a@x.com", "9876543210").await;

    let (_, body) = app
        .post(
            "/api/v1/admin/add_product",
            json!({"name": "Veg Puff", "price": 25, "category": "Snacks", "image": "🥐"}),
            Some(&admin),
        )
        .await;
    let product_id = body["product"]["id"].as_i64().unwrap();
    app.put(
        &format!("/api/v1/admin/toggle-stock/{product_id}"),
        json!({}),
        Some(&admin),
    )
    .await;

    let order = json!({
        "items": [{"productId": product_id, "name": "Veg Puff", "price": 25, "quantity": 4}],
        "totalAmount": 100,
        "tableNo": "T2"
    });
    place(&app, &customer, order).await;
}

#[tokio::test]
async fn test_transition_errors() {
    let app = TestApp::new();
    let customer = app.customer("Asha Verma", "a@x.com", "9876543210").await;
    let admin = app.admin("manager@bakers.in").await;
    let order_id = place(&app, &customer, two_item_order()).await;

    // Missing order wins over a bad status value
    let (status, body) = app
        .put(
            "/api/v1/admin/order-status/424242",
            json!({ "status": "Teleported" }),
            Some(&admin),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["msg"], "Order not found");

    // Ids that could never be stored are missing too
    for id in ["99999999999", "65f1c2a9e4b0a1b2c3d4e5f6"] {
        let (status, body) = app
            .put(
                &format!("/api/v1/admin/order-status/{id}"),
                json!({ "status": "Delivered" }),
                Some(&admin),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "id {id}");
        assert_eq!(body["msg"], "Order not found");
    }

    let (status, body) = app
        .put(
            &format!("/api/v1/admin/order-status/{order_id}"),
            json!({ "status": "Teleported" }),
            Some(&admin),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Invalid Status Value");

    // Customers cannot move orders
    let (status, _) = app
        .put(
            &format!("/api/v1/admin/order-status/{order_id}"),
            json!({ "status": "Cancelled" }),
            Some(&customer),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_strict_lifecycle() {
    let app = TestApp::with_policy(TransitionPolicy::Strict);
    let customer = app.customer("Asha Verma", "a@x.com", "9876543210").await;
    let admin = app.admin("manager@bakers.in").await;
    let order_id = place(&app, &customer, two_item_order()).await;
    let path = format!("/api/v1/admin/order-status/{order_id}");

    let (status, body) = app
        .put(&path, json!({ "status": "Delivered" }), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "illegal_transition");

    for step in ["Preparing", "Out for Delivery", "Delivered"] {
        let (status, _) = app.put(&path, json!({ "status": step }), Some(&admin)).await;
        assert_eq!(status, StatusCode::OK, "step to {step}");
    }

    let (status, _) = app
        .put(&path, json!({ "status": "Cancelled" }), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_admin_board_and_analytics() {
    let app = TestApp::new();
    let customer = app.customer("Asha Verma", "a@x.com", "9876543210").await;
    let admin = app.admin("manager@bakers.in").await;

    let first = place(&app, &customer, two_item_order()).await;
    let second = place(
        &app,
        &customer,
        json!({
            "items": [{"name": "Black Forest Cake", "price": "450.50", "quantity": 1}],
            "totalAmount": "450.50",
            "tableNo": "T4"
        }),
    )
    .await;

    let (_, body) = app.get("/api/v1/admin/orders", Some(&admin)).await;
    let orders = body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["id"].as_i64().unwrap(), second);
    assert_eq!(orders[0]["customer"]["name"], "Asha Verma");
    assert_eq!(orders[0]["customer"]["phone"], "9876543210");

    app.put(
        &format!("/api/v1/admin/order-status/{first}"),
        json!({ "status": "Delivered" }),
        Some(&admin),
    )
    .await;

    let (status, body) = app.get("/api/v1/admin/analytics", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"]["totalOrders"], 2);
    assert_eq!(body["total"]["totalRevenue"], "700.50");
    assert_eq!(body["today"]["todayOrders"], 2);
    assert_eq!(body["trend"].as_array().unwrap().len(), 1);
    assert_eq!(body["trend"][0]["dailyRevenue"], "700.50");

    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["id"].as_i64().unwrap(), first);
    assert_eq!(history[0]["customer"]["email"], "a@x.com");
}

#[tokio::test]
async fn test_orders_outlive_their_customer() {
    let app = TestApp::new();
    let customer = app.customer("Asha Verma", "a@x.com", "9876543210").await;
    let admin = app.admin("manager@bakers.in").await;
    place(&app, &customer, two_item_order()).await;

    let user = app
        .store
        .get_by_email(&Email::parse("a@x.com").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert!(app.store.delete_user(user.id).await);

    let (_, body) = app.get("/api/v1/admin/orders", Some(&admin)).await;
    let orders = body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert!(orders[0]["customer"].is_null());
    assert!(orders[0]["userId"].is_null());
}
