//! HTTP route handlers for the ordering API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                                  - Service banner
//! GET    /health                            - Liveness
//! GET    /health/ready                      - Readiness (storage ping)
//!
//! # Customer
//! POST   /api/v1/user/signup                - Start signup, mail a code
//! POST   /api/v1/user/verify-otp            - Verify the code
//! POST   /api/v1/user/signin                - Sign in, receive a token
//! GET    /api/v1/user/menu                  - The menu
//! POST   /api/v1/user/place-order           - Place an order (token)
//! GET    /api/v1/user/orders                - Own orders (token)
//!
//! # Admin (token with admin role)
//! GET    /api/v1/admin/orders               - All orders
//! GET    /api/v1/admin/products             - The menu
//! PUT    /api/v1/admin/order-status/{id}    - Set an order's status
//! POST   /api/v1/admin/add_product          - Add a menu item
//! POST   /api/v1/admin/add-bulk-products    - Add many menu items
//! DELETE /api/v1/admin/remove-product/{id}  - Remove a menu item
//! PUT    /api/v1/admin/toggle-stock/{id}    - Flip availability
//! GET    /api/v1/admin/analytics            - Sales figures
//! ```

pub mod admin;
pub mod extract;
pub mod user;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::middleware::{error_detail_middleware, request_id_middleware};
use crate::state::AppState;

/// Create the customer routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(user::signup))
        .route("/verify-otp", post(user::verify_otp))
        .route("/signin", post(user::signin))
        .route("/menu", get(user::menu))
        .route("/place-order", post(user::place_order))
        .route("/orders", get(user::my_orders))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(admin::orders))
        .route("/products", get(admin::products))
        .route("/order-status/{id}", put(admin::update_order_status))
        .route("/add_product", post(admin::add_product))
        .route("/add-bulk-products", post(admin::add_bulk_products))
        .route("/remove-product/{id}", delete(admin::remove_product))
        .route("/toggle-stock/{id}", put(admin::toggle_stock))
        .route("/analytics", get(admin::analytics))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api/v1/user", user_routes())
        .nest("/api/v1/admin", admin_routes())
        .fallback(not_found)
}

/// The complete application with its middleware, ready to serve.
///
/// Sentry layers are added by the binary on top of this.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(from_fn_with_state(state.clone(), error_detail_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

/// Service banner.
async fn index(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config().environment.as_str(),
    }))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if storage is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.stores().users.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, header};
    use axum::response::Response;
    use chrono::Duration;
    use secrecy::SecretString;
    use tower::ServiceExt;

    use bakehouse_core::{Email, Role, TransitionPolicy, UserId};

    use super::*;
    use crate::config::{AppConfig, Environment, LogFormat};
    use crate::db::{MemoryStore, ProductStore, Stores};
    use crate::middleware::{AUTH_TOKEN_HEADER, REQUEST_ID_HEADER};
    use crate::services::RecordingNotifier;

    struct Harness {
        store: Arc<MemoryStore>,
        notifier: Arc<RecordingNotifier>,
        state: AppState,
    }

    fn config(environment: Environment) -> AppConfig {
        AppConfig {
            database_url: SecretString::from("postgres://unused"),
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            environment,
            store_name: "Test Bakers".to_string(),
            token_secret: SecretString::from("k9#Lq2@vX7!mR4$wZ8^bN1&cT5*hY3%e"),
            token_ttl: Duration::hours(24),
            order_policy: TransitionPolicy::Permissive,
            email: None,
            log_format: LogFormat::Pretty,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    fn harness(environment: Environment) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let state = AppState::new(
            config(environment),
            Stores::memory(&store),
            notifier.clone(),
        )
        .unwrap();
        Harness {
            store,
            notifier,
            state,
        }
    }

    impl Harness {
        async fn send(&self, request: Request<Body>) -> Response {
            app(self.state.clone()).oneshot(request).await.unwrap()
        }

        fn token_for(&self, id: i32, role: Role) -> String {
            self.state
                .sessions()
                .issue(UserId::new(id), role, chrono::Utc::now())
                .unwrap()
                .token
        }
    }

    fn json_request(method: Method, uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(AUTH_TOKEN_HEADER, token);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTH_TOKEN_HEADER, token);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_and_banner() {
        let h = harness(Environment::Development);

        let response = h.send(get_request("/health", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));

        let response = h.send(get_request("/health/ready", None)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(h.send(get_request("/", None)).await).await;
        assert_eq!(body["environment"], "development");
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let h = harness(Environment::Development);
        let request = Request::builder()
            .uri("/health")
            .header(REQUEST_ID_HEADER, "edge-42")
            .body(Body::empty())
            .unwrap();

        let response = h.send(request).await;
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "edge-42");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let h = harness(Environment::Production);
        let response = h.send(get_request("/api/v1/user/nope", None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"], "not_found");
        assert!(body.get("detail").is_none());
    }

    #[tokio::test]
    async fn test_signup_verify_signin() {
        let h = harness(Environment::Development);

        let signup = json!({
            "name": "Asha Verma",
            "email": "Asha@Example.com",
            "password": "secret1",
            "phone": "9876543210"
        });
        let response = h
            .send(json_request(Method::POST, "/api/v1/user/signup", &signup, None))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_json(response).await["msg"],
            "OTP sent to your email! Please verify to complete signup."
        );

        let email = Email::parse("asha@example.com").unwrap();
        let code = h.notifier.last_code_for(&email).await.unwrap();

        let wrong = json!({ "email": "asha@example.com", "otp": "not-it" });
        let response = h
            .send(json_request(Method::POST, "/api/v1/user/verify-otp", &wrong, None))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["msg"], "Invalid OTP");

        let right = json!({ "email": "asha@example.com", "otp": code.as_str() });
        let response = h
            .send(json_request(Method::POST, "/api/v1/user/verify-otp", &right, None))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let signin = json!({ "email": "asha@example.com", "password": "secret1" });
        let response = h
            .send(json_request(Method::POST, "/api/v1/user/signin", &signin, None))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["token"].as_str().unwrap().split('.').count(), 3);
        assert_eq!(body["user"]["email"], "asha@example.com");
        assert_eq!(body["user"]["role"], "customer");
    }

    #[tokio::test]
    async fn test_signup_validation_message() {
        let h = harness(Environment::Development);
        let signup = json!({
            "name": "Asha",
            "email": "asha@example.com",
            "password": "secret1",
            "phone": "1234567890"
        });
        let response = h
            .send(json_request(Method::POST, "/api/v1/user/signup", &signup, None))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["msg"], "Invalid Indian phone number");
        assert!(h.notifier.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_json_400() {
        let h = harness(Environment::Development);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/user/signin")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = h.send(request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "validation");
    }

    #[tokio::test]
    async fn test_token_required_for_orders() {
        let h = harness(Environment::Development);

        let response = h.send(get_request("/api/v1/user/orders", None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["msg"], "No token, access denied");

        let response = h
            .send(get_request("/api/v1/user/orders", Some("a.b.c")))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["msg"], "Invalid token");
    }

    #[tokio::test]
    async fn test_expired_token_message() {
        let h = harness(Environment::Development);
        let stale = h
            .state
            .sessions()
            .issue(
                UserId::new(1),
                Role::Customer,
                chrono::Utc::now() - Duration::hours(25),
            )
            .unwrap()
            .token;

        let response = h
            .send(get_request("/api/v1/user/orders", Some(&stale)))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await["msg"],
            "Token expired, please login again"
        );
    }

    #[tokio::test]
    async fn test_admin_routes_refuse_customers() {
        let h = harness(Environment::Development);
        let token = h.token_for(1, Role::Customer);

        let response = h
            .send(get_request("/api/v1/admin/analytics", Some(&token)))
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await["msg"], "Access denied! Admins only.");
    }

    #[tokio::test]
    async fn test_place_order_and_set_status() {
        let h = harness(Environment::Development);
        let customer = h.token_for(7, Role::Customer);
        let admin = h.token_for(1, Role::Admin);

        let order = json!({
            "items": [
                {"name": "Paneer Puff", "price": 100, "quantity": 2},
                {"name": "Masala Chai", "price": 50, "quantity": 1}
            ],
            "totalAmount": 250,
            "tableNo": "T4"
        });
        let response = h
            .send(json_request(
                Method::POST,
                "/api/v1/user/place-order",
                &order,
                Some(&customer),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Order placed successfully!");
        let order_id = body["orderId"].as_i64().unwrap();

        let body = body_json(h.send(get_request("/api/v1/user/orders", Some(&customer))).await).await;
        assert_eq!(body["orders"][0]["status"], "Order Placed");
        assert_eq!(body["orders"][0]["totalAmount"], "250");

        let status = json!({ "status": "Delivered" });
        let response = h
            .send(json_request(
                Method::PUT,
                &format!("/api/v1/admin/order-status/{order_id}"),
                &status,
                Some(&admin),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Status updated to Delivered");
        assert_eq!(body["order"]["status"], "Delivered");

        let bogus = json!({ "status": "Shipped" });
        let response = h
            .send(json_request(
                Method::PUT,
                &format!("/api/v1/admin/order-status/{order_id}"),
                &bogus,
                Some(&admin),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["msg"], "Invalid Status Value");

        let response = h
            .send(json_request(
                Method::PUT,
                "/api/v1/admin/order-status/9999",
                &bogus,
                Some(&admin),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["msg"], "Order not found");

        let body = body_json(h.send(get_request("/api/v1/admin/analytics", Some(&admin))).await).await;
        assert_eq!(body["total"]["totalOrders"], 1);
        assert_eq!(body["total"]["totalRevenue"], "250");
        assert_eq!(body["history"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_catalog_management() {
        let h = harness(Environment::Development);
        let admin = h.token_for(1, Role::Admin);

        let product = json!({
            "name": "Black Forest Cake",
            "price": 450,
            "category": "Cakes",
            "image": "🎂"
        });
        let response = h
            .send(json_request(
                Method::POST,
                "/api/v1/admin/add_product",
                &product,
                Some(&admin),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Product added successfully!");
        let id = body["product"]["id"].as_i64().unwrap();
        assert_eq!(body["product"]["isAvailable"], true);

        let response = h
            .send(json_request(
                Method::PUT,
                &format!("/api/v1/admin/toggle-stock/{id}"),
                &json!({}),
                Some(&admin),
            ))
            .await;
        assert_eq!(
            body_json(response).await["message"],
            "Product is now Out of Stock"
        );

        let body = body_json(h.send(get_request("/api/v1/user/menu", None)).await).await;
        assert_eq!(body["products"][0]["isAvailable"], false);

        let request = Request::builder()
            .method(Method::DELETE)
            .uri(format!("/api/v1/admin/remove-product/{id}"))
            .header(AUTH_TOKEN_HEADER, &admin)
            .body(Body::empty())
            .unwrap();
        let response = h.send(request).await;
        assert_eq!(
            body_json(response).await["message"],
            "Product deleted successfully"
        );

        let request = Request::builder()
            .method(Method::DELETE)
            .uri(format!("/api/v1/admin/remove-product/{id}"))
            .header(AUTH_TOKEN_HEADER, &admin)
            .body(Body::empty())
            .unwrap();
        let response = h.send(request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["msg"], "Product not found");
    }

    #[tokio::test]
    async fn test_bulk_upload_is_all_or_nothing() {
        let h = harness(Environment::Development);
        let admin = h.token_for(1, Role::Admin);

        let batch = json!([
            {"name": "Rusk", "price": 40, "category": "Bakery", "image": "🍞"},
            {"name": "Puff", "price": 0, "category": "Snacks", "image": "🥐"}
        ]);
        let response = h
            .send(json_request(
                Method::POST,
                "/api/v1/admin/add-bulk-products",
                &batch,
                Some(&admin),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(ProductStore::list(h.store.as_ref()).await.unwrap().is_empty());

        let batch = json!([
            {"name": "Rusk", "price": 40, "category": "Bakery", "image": "🍞"},
            {"name": "Puff", "price": "25.50", "category": "Snacks", "image": "🥐"}
        ]);
        let body = body_json(
            h.send(json_request(
                Method::POST,
                "/api/v1/admin/add-bulk-products",
                &batch,
                Some(&admin),
            ))
            .await,
        )
        .await;
        assert_eq!(body["message"], "Menu updated successfully!");
        assert_eq!(body["count"], 2);
        assert_eq!(body["items"][1]["price"], "25.50");
    }

    #[tokio::test]
    async fn test_error_detail_only_in_development() {
        let dev = harness(Environment::Development);
        let prod = harness(Environment::Production);

        let path = "/api/v1/admin/remove-product/not-a-number";
        let admin = dev.token_for(1, Role::Admin);
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(path)
            .header(AUTH_TOKEN_HEADER, &admin)
            .body(Body::empty())
            .unwrap();
        let body = body_json(dev.send(request).await).await;
        assert_eq!(body["error"], "validation");
        assert!(body["detail"].as_str().unwrap().starts_with("Bad request"));

        let admin = prod.token_for(1, Role::Admin);
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(path)
            .header(AUTH_TOKEN_HEADER, &admin)
            .body(Body::empty())
            .unwrap();
        let body = body_json(prod.send(request).await).await;
        assert_eq!(body["error"], "validation");
        assert!(body.get("detail").is_none());
    }
}
