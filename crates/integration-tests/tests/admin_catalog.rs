//! Menu management through the admin API.

use axum::http::{Method, StatusCode};
use serde_json::json;

use bakehouse_integration_tests::TestApp;

#[tokio::test]
async fn test_menu_lifecycle() {
    let app = TestApp::new();
    let admin = app.admin("manager@bakers.in").await;

    let (status, body) = app
        .post(
            "/api/v1/admin/add-bulk-products",
            json!([
                {"name": "Masala Chai", "price": 30, "category": "Beverages", "image": "☕"},
                {"name": "Black Forest Cake", "price": 450, "category": "Cakes", "image": "🎂",
                 "description": "Chocolate sponge with cherries"},
                {"name": "Veg Puff", "price": "25.50", "category": "Snacks", "image": "🥐"}
            ]),
            Some(&admin),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);

    let (status, body) = app.get("/api/v1/user/menu", None).await;
    assert_eq!(status, StatusCode::OK);
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 3);
    assert!(products.iter().all(|p| p["isAvailable"] == true));
    let puff_id = products[2]["id"].as_i64().unwrap();

    let (_, body) = app
        .put(
            &format!("/api/v1/admin/toggle-stock/{puff_id}"),
            json!({}),
            Some(&admin),
        )
        .await;
    assert_eq!(body["message"], "Product is now Out of Stock");
    let (_, body) = app
        .put(
            &format!("/api/v1/admin/toggle-stock/{puff_id}"),
            json!({}),
            Some(&admin),
        )
        .await;
    assert_eq!(body["message"], "Product is now Available");

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/admin/remove-product/{puff_id}"),
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/api/v1/admin/products", Some(&admin)).await;
    assert_eq!(body["products"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_product_validation() {
    let app = TestApp::new();
    let admin = app.admin("manager@bakers.in").await;

    let (status, _) = app
        .post(
            "/api/v1/admin/add_product",
            json!({"name": "Free Sample", "price": 0, "category": "Snacks", "image": "🍪"}),
            Some(&admin),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/admin/add_product",
            json!({"name": "Rusk", "price": 40, "category": "Bakery", "image": "  "}),
            Some(&admin),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/api/v1/admin/add-bulk-products", json!([]), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.get("/api/v1/user/menu", None).await;
    assert_eq!(body["products"], json!([]));
}

#[tokio::test]
async fn test_unknown_product_ids() {
    let app = TestApp::new();
    let admin = app.admin("manager@bakers.in").await;

    for id in ["404", "99999999999", "veg-puff"] {
        let (status, body) = app
            .put(
                &format!("/api/v1/admin/toggle-stock/{id}"),
                json!({}),
                Some(&admin),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "toggle {id}");
        assert_eq!(body["msg"], "Product not found");

        let (status, _) = app
            .request(
                Method::DELETE,
                &format!("/api/v1/admin/remove-product/{id}"),
                None,
                Some(&admin),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "remove {id}");
    }
}

#[tokio::test]
async fn test_catalog_routes_need_admin() {
    let app = TestApp::new();
    let customer = app.customer("Asha Verma", "a@x.com", "9876543210").await;
    let product = json!({"name": "Rusk", "price": 40, "category": "Bakery", "image": "🍞"});

    let (status, body) = app
        .post("/api/v1/admin/add_product", product.clone(), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["msg"], "No token, access denied");

    let (status, _) = app
        .post("/api/v1/admin/add_product", product, Some(&customer))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .request(
            Method::DELETE,
            "/api/v1/admin/remove-product/77",
            None,
            Some(&customer),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["msg"], "Access denied! Admins only.");
}
