//! Integration tests for Bakehouse.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process scenarios (no database needed)
//! cargo test -p bakehouse-integration-tests
//!
//! # Smoke tests against a running server
//! BAKEHOUSE_BASE_URL=http://localhost:5001 cargo test -p bakehouse-integration-tests -- --ignored
//! ```
//!
//! [`TestApp`] drives the full router in-process with in-memory storage and a
//! notifier that records codes instead of mailing them.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use chrono::Duration;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use bakehouse_core::{Email, Role, TransitionPolicy};
use bakehouse_server::config::{AppConfig, Environment, LogFormat};
use bakehouse_server::db::{MemoryStore, Stores, UserStore};
use bakehouse_server::middleware::AUTH_TOKEN_HEADER;
use bakehouse_server::routes;
use bakehouse_server::services::RecordingNotifier;
use bakehouse_server::state::AppState;

/// Password used for every account created by the helpers.
pub const PASSWORD: &str = "secret1";

/// Configuration for an in-process server.
#[must_use]
pub fn test_config(order_policy: TransitionPolicy) -> AppConfig {
    AppConfig {
        database_url: SecretString::from("postgres://unused"),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        environment: Environment::Development,
        store_name: "Shree Krishna Bakers".to_string(),
        token_secret: SecretString::from("Qm7#vR2!xL9@kT4$wN8^pZ1&cH5*jD3%"),
        token_ttl: Duration::hours(24),
        order_policy,
        email: None,
        log_format: LogFormat::Pretty,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// The application wired to in-memory storage.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub state: AppState,
}

impl TestApp {
    /// An app with the default (permissive) order lifecycle.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(TransitionPolicy::Permissive)
    }

    #[must_use]
    pub fn with_policy(order_policy: TransitionPolicy) -> Self {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let state = AppState::new(
            test_config(order_policy),
            Stores::memory(&store),
            notifier.clone(),
        )
        .unwrap();

        Self {
            store,
            notifier,
            state,
        }
    }

    /// Send a request and return the status and JSON body (`Null` when the
    /// body is not JSON).
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(AUTH_TOKEN_HEADER, token);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = routes::app(self.state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, path, None, token).await
    }

    pub async fn post(&self, path: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::POST, path, Some(body), token).await
    }

    pub async fn put(&self, path: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::PUT, path, Some(body), token).await
    }

    /// The last code mailed to `email`.
    pub async fn code_for(&self, email: &str) -> String {
        let email = Email::parse(email).unwrap();
        self.notifier
            .last_code_for(&email)
            .await
            .unwrap()
            .as_str()
            .to_string()
    }

    /// Sign up, verify and sign in; returns the session token.
    pub async fn customer(&self, name: &str, email: &str, phone: &str) -> String {
        let (status, _) = self
            .post(
                "/api/v1/user/signup",
                json!({ "name": name, "email": email, "password": PASSWORD, "phone": phone }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let code = self.code_for(email).await;
        let (status, _) = self
            .post(
                "/api/v1/user/verify-otp",
                json!({ "email": email, "otp": code }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        self.signin(email).await
    }

    /// A verified account promoted to admin; returns its session token.
    pub async fn admin(&self, email: &str) -> String {
        self.customer("Store Manager", email, "9123456780").await;
        self.store
            .set_role(&Email::parse(email).unwrap(), Role::Admin)
            .await
            .unwrap();
        // Role is read at sign-in, so sign in again after the change
        self.signin(email).await
    }

    pub async fn signin(&self, email: &str) -> String {
        let (status, body) = self
            .post(
                "/api/v1/user/signin",
                json!({ "email": email, "password": PASSWORD }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "signin failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Base URL of a running server for smoke tests.
#[must_use]
pub fn live_base_url() -> String {
    std::env::var("BAKEHOUSE_BASE_URL").unwrap_or_else(|_| "http://localhost:5001".to_string())
}
