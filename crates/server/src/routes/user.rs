//! Customer routes: signup, verification, sign-in, menu and orders.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use bakehouse_core::{NewOrder, OrderId};

use super::extract::ApiJson;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{Order, Product, PublicProfile};
use crate::services::auth::Signup;
use crate::state::AppState;

/// Verification form.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

/// Sign-in form.
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SigninResponse {
    pub token: String,
    pub user: PublicProfile,
}

#[derive(Debug, Serialize)]
pub struct MenuResponse {
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    pub message: &'static str,
    pub order_id: OrderId,
}

#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub orders: Vec<Order>,
}

/// Start a signup and mail the verification code.
///
/// POST /api/v1/user/signup
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<Signup>,
) -> Result<(StatusCode, Json<Value>)> {
    state.auth().request_registration(&form, Utc::now()).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "msg": "OTP sent to your email! Please verify to complete signup." })),
    ))
}

/// Verify an account with its code.
///
/// POST /api/v1/user/verify-otp
pub async fn verify_otp(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<VerifyOtpRequest>,
) -> Result<Json<Value>> {
    state
        .auth()
        .verify(&form.email, &form.otp, Utc::now())
        .await?;

    Ok(Json(
        json!({ "msg": "Account verified and created! You can now login." }),
    ))
}

/// Sign in and receive a session token.
///
/// POST /api/v1/user/signin
pub async fn signin(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<SigninRequest>,
) -> Result<Json<SigninResponse>> {
    let signed_in = state
        .auth()
        .authenticate(&form.email, &form.password, Utc::now())
        .await?;

    Ok(Json(SigninResponse {
        token: signed_in.token.token,
        user: signed_in.user.profile(),
    }))
}

/// The full menu, including items that are out of stock.
///
/// GET /api/v1/user/menu
pub async fn menu(State(state): State<AppState>) -> Result<Json<MenuResponse>> {
    let products = state.catalog().list().await?;
    Ok(Json(MenuResponse { products }))
}

/// Place an order for the signed-in account.
///
/// POST /api/v1/user/place-order
pub async fn place_order(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    ApiJson(order): ApiJson<NewOrder>,
) -> Result<Json<PlaceOrderResponse>> {
    let order = state.orders().place(claims.sub, order).await?;

    Ok(Json(PlaceOrderResponse {
        message: "Order placed successfully!",
        order_id: order.id,
    }))
}

/// The signed-in account's orders, newest first.
///
/// GET /api/v1/user/orders
pub async fn my_orders(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
) -> Result<Json<OrdersResponse>> {
    let orders = state.orders().list_for_user(claims.sub).await?;
    Ok(Json(OrdersResponse { orders }))
}
