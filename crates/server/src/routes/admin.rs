//! Admin routes: the kitchen board, menu management and analytics.
//!
//! Every handler takes [`RequireAdmin`], so a missing or bad token is a 401
//! and a customer token is a 403.

use axum::{Json, extract::State};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use bakehouse_core::{OrderId, ProductId};

use super::extract::{ApiJson, ApiPath};
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{AdminOrder, DailyRevenue, NewProduct, Order, Product};
use crate::services::{CatalogError, OrderError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AdminOrdersResponse {
    pub orders: Vec<AdminOrder>,
}

#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct OrderUpdatedResponse {
    pub message: String,
    pub order: Order,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub message: String,
    pub product: Product,
}

#[derive(Debug, Serialize)]
pub struct BulkProductsResponse {
    pub message: &'static str,
    pub count: usize,
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifetimeTotals {
    pub total_revenue: Decimal,
    pub total_orders: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayTotals {
    pub today_revenue: Decimal,
    pub today_orders: i64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub total: LifetimeTotals,
    pub today: TodayTotals,
    pub trend: Vec<DailyRevenue>,
    pub history: Vec<AdminOrder>,
}

// An id that does not parse names no stored row.
fn order_id(raw: &str) -> std::result::Result<OrderId, OrderError> {
    raw.parse().map_err(|_| OrderError::NotFound)
}

fn product_id(raw: &str) -> std::result::Result<ProductId, CatalogError> {
    raw.parse().map_err(|_| CatalogError::NotFound)
}

/// Every order with customer contact fields, newest first.
///
/// GET /api/v1/admin/orders
pub async fn orders(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<AdminOrdersResponse>> {
    let orders = state.orders().list_all().await?;
    Ok(Json(AdminOrdersResponse { orders }))
}

/// The menu, for management.
///
/// GET /api/v1/admin/products
pub async fn products(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<ProductsResponse>> {
    let products = state.catalog().list().await?;
    Ok(Json(ProductsResponse { products }))
}

/// Set an order's status.
///
/// PUT /api/v1/admin/order-status/{id}
pub async fn update_order_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<String>,
    ApiJson(body): ApiJson<StatusRequest>,
) -> Result<Json<OrderUpdatedResponse>> {
    let id = order_id(&id)?;
    let order = state.orders().transition(id, &body.status).await?;
    tracing::info!(order_id = %id, status = %order.status, admin_id = %admin.sub, "Order status set");

    Ok(Json(OrderUpdatedResponse {
        message: format!("Status updated to {}", order.status),
        order,
    }))
}

/// Add one menu item.
///
/// POST /api/v1/admin/add_product
pub async fn add_product(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiJson(product): ApiJson<NewProduct>,
) -> Result<Json<ProductResponse>> {
    let product = state.catalog().create(product).await?;

    Ok(Json(ProductResponse {
        message: "Product added successfully!".to_string(),
        product,
    }))
}

/// Add many menu items at once. Nothing is stored if any item is invalid.
///
/// POST /api/v1/admin/add-bulk-products
pub async fn add_bulk_products(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiJson(products): ApiJson<Vec<NewProduct>>,
) -> Result<Json<BulkProductsResponse>> {
    let items = state.catalog().create_many(products).await?;

    Ok(Json(BulkProductsResponse {
        message: "Menu updated successfully!",
        count: items.len(),
        items,
    }))
}

/// Remove a menu item.
///
/// DELETE /api/v1/admin/remove-product/{id}
pub async fn remove_product(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Value>> {
    let id = product_id(&id)?;
    state.catalog().remove(id).await?;
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

/// Flip a menu item between available and out of stock.
///
/// PUT /api/v1/admin/toggle-stock/{id}
pub async fn toggle_stock(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<ProductResponse>> {
    let id = product_id(&id)?;
    let product = state.catalog().toggle_availability(id).await?;
    let label = if product.is_available {
        "Available"
    } else {
        "Out of Stock"
    };

    Ok(Json(ProductResponse {
        message: format!("Product is now {label}"),
        product,
    }))
}

/// Dashboard sales figures.
///
/// GET /api/v1/admin/analytics
pub async fn analytics(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<AnalyticsResponse>> {
    let snapshot = state.analytics().snapshot(Utc::now()).await?;

    Ok(Json(AnalyticsResponse {
        total: LifetimeTotals {
            total_revenue: snapshot.total.revenue,
            total_orders: snapshot.total.orders,
        },
        today: TodayTotals {
            today_revenue: snapshot.today.revenue,
            today_orders: snapshot.today.orders,
        },
        trend: snapshot.trend,
        history: snapshot.history,
    }))
}
