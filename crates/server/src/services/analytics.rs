//! Sales figures for the admin dashboard.

use chrono::{DateTime, Duration, NaiveTime, Utc};

use bakehouse_core::OrderStatus;

use crate::db::{OrderStore, RepositoryError};
use crate::models::{AdminOrder, DailyRevenue, SalesTotals};

/// Days covered by the revenue trend, today included.
pub const TREND_DAYS: i64 = 7;

/// Delivered orders shown in the history table.
pub const HISTORY_LIMIT: u32 = 50;

/// Everything the dashboard shows at once.
#[derive(Debug, Clone)]
pub struct AnalyticsSnapshot {
    pub total: SalesTotals,
    pub today: SalesTotals,
    /// Revenue per day over the last [`TREND_DAYS`] days, oldest first.
    /// Days without orders are omitted.
    pub trend: Vec<DailyRevenue>,
    /// The latest delivered orders, newest first.
    pub history: Vec<AdminOrder>,
}

pub struct AnalyticsService<'a> {
    orders: &'a dyn OrderStore,
}

impl<'a> AnalyticsService<'a> {
    #[must_use]
    pub const fn new(orders: &'a dyn OrderStore) -> Self {
        Self { orders }
    }

    /// Compute the dashboard figures as of `now`. Days are UTC days.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if any query fails.
    pub async fn snapshot(&self, now: DateTime<Utc>) -> Result<AnalyticsSnapshot, RepositoryError> {
        let start_of_today = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let trend_start = start_of_today - Duration::days(TREND_DAYS - 1);

        let total = self.orders.sales_totals(None).await?;
        let today = self.orders.sales_totals(Some(start_of_today)).await?;
        let trend = self.orders.daily_revenue(trend_start).await?;
        let history = self
            .orders
            .recent_with_status(OrderStatus::Delivered, HISTORY_LIMIT)
            .await?;

        Ok(AnalyticsSnapshot {
            total,
            today,
            trend,
            history,
        })
    }
}
