//! The order ledger and its status lifecycle.

use thiserror::Error;

use bakehouse_core::{
    NewOrder, OrderId, OrderStatus, OrderValidationError, StatusParseError, TransitionError,
    TransitionPolicy, UserId,
};

use crate::db::{OrderStore, RepositoryError, StatusUpdate};
use crate::models::{AdminOrder, Order};

/// Errors from order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error(transparent)]
    Invalid(#[from] OrderValidationError),

    #[error(transparent)]
    InvalidStatus(#[from] StatusParseError),

    #[error(transparent)]
    IllegalTransition(#[from] TransitionError),

    #[error("order not found")]
    NotFound,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Order service.
pub struct OrderService<'a> {
    orders: &'a dyn OrderStore,
    policy: TransitionPolicy,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(orders: &'a dyn OrderStore, policy: TransitionPolicy) -> Self {
        Self { orders, policy }
    }

    /// Place an order for `user_id`. It starts out as `Order Placed`.
    ///
    /// Availability of the menu items is not checked.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Invalid` if the order fails placement validation.
    pub async fn place(&self, user_id: UserId, order: NewOrder) -> Result<Order, OrderError> {
        let order = order.validate()?;
        let placed = self.orders.create(user_id, &order).await?;
        tracing::info!(
            order_id = %placed.id,
            user_id = %user_id,
            total = %placed.total_amount,
            items = placed.items.len(),
            "Order placed"
        );
        Ok(placed)
    }

    /// Move an order to the status named by `status`.
    ///
    /// A missing order is reported as not found whatever the status string.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound`, `OrderError::InvalidStatus` for an
    /// unknown status label, or `OrderError::IllegalTransition` when the
    /// strict policy forbids the move.
    pub async fn transition(&self, id: OrderId, status: &str) -> Result<Order, OrderError> {
        let to = match status.parse::<OrderStatus>() {
            Ok(to) => to,
            Err(e) => {
                if self.orders.get(id).await?.is_none() {
                    return Err(OrderError::NotFound);
                }
                return Err(e.into());
            }
        };

        let allowed_from = self.policy.allowed_predecessors(to);
        match self.orders.update_status(id, to, &allowed_from).await? {
            StatusUpdate::Updated(order) => {
                tracing::info!(order_id = %id, status = %to, "Order status changed");
                Ok(order)
            }
            StatusUpdate::NotFound => Err(OrderError::NotFound),
            StatusUpdate::Rejected { current } => {
                tracing::info!(order_id = %id, from = %current, to = %to, "Order status change refused");
                Err(TransitionError { from: current, to }.into())
            }
        }
    }

    /// Orders placed by one account, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list_for_user(user_id).await?)
    }

    /// Every order with its customer's contact fields, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<AdminOrder>, OrderError> {
        Ok(self.orders.list_all().await?)
    }
}
