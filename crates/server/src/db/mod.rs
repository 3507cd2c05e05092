//! Storage for the ordering API.
//!
//! # Database
//!
//! ## Tables
//!
//! - `users` - Accounts, including unverified signups holding a one-time code
//! - `products` - The menu
//! - `orders` - Placed orders with their line items as JSONB
//!
//! # Backends
//!
//! Services reach storage through the [`UserStore`], [`ProductStore`] and
//! [`OrderStore`] traits. `PostgreSQL` is the production backend; the
//! in-memory [`MemoryStore`] backs tests and local demos.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p bakehouse-cli -- migrate
//! ```

pub mod memory;
pub mod orders;
pub mod products;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use bakehouse_core::{
    Email, NewOrder, OrderId, OrderStatus, OtpCode, OtpError, ProductId, Role, UserId,
};

use crate::models::{
    AdminOrder, DailyRevenue, NewProduct, Order, PendingRegistration, Product, SalesTotals, User,
};

pub use memory::MemoryStore;
pub use orders::PgOrderStore;
pub use products::PgProductStore;
pub use users::PgUserStore;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Result of submitting a one-time code.
#[derive(Debug, Clone)]
pub enum OtpAttempt {
    /// The account is now verified and its code is gone.
    Verified(User),
    /// No account exists for the email.
    UnknownEmail,
    /// The code was not accepted. On [`OtpError::Expired`] the stored code has
    /// already been cleared.
    Rejected(OtpError),
}

/// Result of a status change.
#[derive(Debug, Clone)]
pub enum StatusUpdate {
    Updated(Order),
    NotFound,
    /// The order exists but was not in one of the allowed predecessor states.
    Rejected { current: OrderStatus },
}

/// Account storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Fetch an account together with its password hash, for sign-in.
    async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    /// Write a pending signup in one step: insert a new unverified account,
    /// or overwrite an existing unverified one in place.
    ///
    /// Returns [`RepositoryError::Conflict`] when the email belongs to a
    /// verified account, which is left untouched.
    async fn upsert_pending(
        &self,
        registration: &PendingRegistration,
    ) -> Result<User, RepositoryError>;

    /// Delete an unverified account, but only while it still holds `code`.
    ///
    /// Returns whether a row was removed.
    async fn discard_pending(&self, email: &Email, code: &OtpCode)
    -> Result<bool, RepositoryError>;

    /// Check `submitted` against the stored code and, if it is accepted,
    /// mark the account verified and clear the code in the same step.
    async fn consume_otp(
        &self,
        email: &Email,
        submitted: &str,
        now: DateTime<Utc>,
    ) -> Result<OtpAttempt, RepositoryError>;

    /// Change the role of a verified account.
    ///
    /// Returns [`RepositoryError::NotFound`] when no verified account has
    /// this email.
    async fn set_role(&self, email: &Email, role: Role) -> Result<User, RepositoryError>;
}

/// Menu storage.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError>;

    /// Create all items or none.
    async fn create_many(&self, products: &[NewProduct]) -> Result<Vec<Product>, RepositoryError>;

    /// Returns whether an item was removed.
    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError>;

    /// Flip the availability flag in one step.
    async fn toggle_availability(&self, id: ProductId)
    -> Result<Option<Product>, RepositoryError>;
}

/// Order ledger storage.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Record a validated order in the `Order Placed` state.
    async fn create(&self, user_id: UserId, order: &NewOrder) -> Result<Order, RepositoryError>;

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Orders placed by one account, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError>;

    /// Every order with customer contact fields, newest first.
    async fn list_all(&self) -> Result<Vec<AdminOrder>, RepositoryError>;

    /// Set the status if the order is currently in one of `allowed_from`.
    async fn update_status(
        &self,
        id: OrderId,
        to: OrderStatus,
        allowed_from: &[OrderStatus],
    ) -> Result<StatusUpdate, RepositoryError>;

    /// Revenue and count of orders created at or after `since` (all orders
    /// when `None`).
    async fn sales_totals(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<SalesTotals, RepositoryError>;

    /// Revenue per UTC day for orders created at or after `since`, ascending.
    async fn daily_revenue(&self, since: DateTime<Utc>)
    -> Result<Vec<DailyRevenue>, RepositoryError>;

    /// The most recent orders in `status` with customer fields, newest first.
    async fn recent_with_status(
        &self,
        status: OrderStatus,
        limit: u32,
    ) -> Result<Vec<AdminOrder>, RepositoryError>;
}

/// The three stores, shared by the services.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub products: Arc<dyn ProductStore>,
    pub orders: Arc<dyn OrderStore>,
}

impl Stores {
    /// `PostgreSQL`-backed stores sharing one pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            users: Arc::new(PgUserStore::new(pool.clone())),
            products: Arc::new(PgProductStore::new(pool.clone())),
            orders: Arc::new(PgOrderStore::new(pool.clone())),
        }
    }

    /// Stores backed by one shared in-memory instance.
    #[must_use]
    pub fn memory(store: &Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            products: store.clone(),
            orders: store.clone(),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
