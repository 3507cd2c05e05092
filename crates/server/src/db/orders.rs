//! `PostgreSQL` order ledger.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use bakehouse_core::{Email, LineItem, NewOrder, OrderId, OrderStatus, Phone, UserId};

use super::{OrderStore, RepositoryError, StatusUpdate};
use crate::models::{AdminOrder, CustomerSummary, DailyRevenue, Order, SalesTotals};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: Option<i32>,
    items: Json<Vec<LineItem>>,
    total_amount: Decimal,
    address: String,
    table_no: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct AdminOrderRow {
    #[sqlx(flatten)]
    order: OrderRow,
    customer_name: Option<String>,
    customer_email: Option<String>,
    customer_phone: Option<String>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<OrderStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("order {}: {e}", row.id))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            user_id: row.user_id.map(UserId::new),
            items: row.items.0,
            total_amount: row.total_amount,
            address: row.address,
            table_no: row.table_no,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<AdminOrderRow> for AdminOrder {
    type Error = RepositoryError;

    fn try_from(row: AdminOrderRow) -> Result<Self, Self::Error> {
        let customer = match (row.customer_name, row.customer_email, row.customer_phone) {
            (Some(name), Some(email), Some(phone)) => Some(CustomerSummary {
                name,
                email: Email::parse(&email).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
                })?,
                phone: Phone::from_trusted(phone),
            }),
            _ => None,
        };

        Ok(Self {
            order: row.order.try_into()?,
            customer,
        })
    }
}

/// Order storage backed by the `orders` table.
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create(&self, user_id: UserId, order: &NewOrder) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO orders (user_id, items, total_amount, address, table_no)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, items, total_amount, address, table_no, status,
                      created_at, updated_at
            ",
        )
        .bind(user_id)
        .bind(Json(&order.items))
        .bind(order.total_amount)
        .bind(&order.address)
        .bind(&order.table_no)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, items, total_amount, address, table_no, status,
                   created_at, updated_at
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, items, total_amount, address, table_no, status,
                   created_at, updated_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    async fn list_all(&self) -> Result<Vec<AdminOrder>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminOrderRow>(
            r"
            SELECT o.id, o.user_id, o.items, o.total_amount, o.address, o.table_no, o.status,
                   o.created_at, o.updated_at,
                   u.name AS customer_name, u.email AS customer_email, u.phone AS customer_phone
            FROM orders o
            LEFT JOIN users u ON u.id = o.user_id
            ORDER BY o.created_at DESC, o.id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AdminOrder::try_from).collect()
    }

    async fn update_status(
        &self,
        id: OrderId,
        to: OrderStatus,
        allowed_from: &[OrderStatus],
    ) -> Result<StatusUpdate, RepositoryError> {
        let allowed: Vec<&str> = allowed_from.iter().map(|s| s.as_str()).collect();

        let row = sqlx::query_as::<_, OrderRow>(
            r"
            UPDATE orders
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status = ANY($3)
            RETURNING id, user_id, items, total_amount, address, table_no, status,
                      created_at, updated_at
            ",
        )
        .bind(id)
        .bind(to.as_str())
        .bind(&allowed)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(StatusUpdate::Updated(row.try_into()?));
        }

        let current: Option<String> = sqlx::query_scalar("SELECT status FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match current {
            None => Ok(StatusUpdate::NotFound),
            Some(status) => {
                let current = status.parse::<OrderStatus>().map_err(|e| {
                    RepositoryError::DataCorruption(format!("order {id}: {e}"))
                })?;
                Ok(StatusUpdate::Rejected { current })
            }
        }
    }

    async fn sales_totals(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<SalesTotals, RepositoryError> {
        let (revenue, orders) = sqlx::query_as::<_, (Decimal, i64)>(
            r"
            SELECT COALESCE(SUM(total_amount), 0), COUNT(*)
            FROM orders
            WHERE $1::timestamptz IS NULL OR created_at >= $1
            ",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(SalesTotals { revenue, orders })
    }

    async fn daily_revenue(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<DailyRevenue>, RepositoryError> {
        let rows = sqlx::query_as::<_, (NaiveDate, Decimal)>(
            r"
            SELECT (created_at AT TIME ZONE 'UTC')::date AS day, SUM(total_amount)
            FROM orders
            WHERE created_at >= $1
            GROUP BY day
            ORDER BY day
            ",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(day, daily_revenue)| DailyRevenue { day, daily_revenue })
            .collect())
    }

    async fn recent_with_status(
        &self,
        status: OrderStatus,
        limit: u32,
    ) -> Result<Vec<AdminOrder>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminOrderRow>(
            r"
            SELECT o.id, o.user_id, o.items, o.total_amount, o.address, o.table_no, o.status,
                   o.created_at, o.updated_at,
                   u.name AS customer_name, u.email AS customer_email, u.phone AS customer_phone
            FROM orders o
            LEFT JOIN users u ON u.id = o.user_id
            WHERE o.status = $1
            ORDER BY o.created_at DESC, o.id DESC
            LIMIT $2
            ",
        )
        .bind(status.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AdminOrder::try_from).collect()
    }
}
