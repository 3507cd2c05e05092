//! Orders as recorded in the ledger, plus the read models used by the
//! admin board and the analytics view.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use bakehouse_core::{Email, LineItem, OrderId, OrderStatus, Phone, UserId};

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// The account that placed the order. `None` once that account is deleted.
    pub user_id: Option<UserId>,
    pub items: Vec<LineItem>,
    pub total_amount: Decimal,
    pub address: String,
    pub table_no: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Customer contact fields shown next to an order on the admin board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerSummary {
    pub name: String,
    pub email: Email,
    pub phone: Phone,
}

/// An order joined with its customer's contact fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminOrder {
    #[serde(flatten)]
    pub order: Order,
    pub customer: Option<CustomerSummary>,
}

/// Revenue and order count over some window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SalesTotals {
    pub revenue: Decimal,
    pub orders: i64,
}

/// Revenue for one UTC calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRevenue {
    pub day: NaiveDate,
    pub daily_revenue: Decimal,
}
