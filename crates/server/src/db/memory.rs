//! In-memory storage backend.
//!
//! Implements all three store traits over one lock, so each trait method is
//! atomic the same way a single conditional SQL statement is. Used by tests
//! and by the integration suite to drive the full router without a database.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use bakehouse_core::{
    Email, NewOrder, OrderId, OrderStatus, OtpCode, OtpError, ProductId, Role, UserId,
    VerificationState,
};

use super::{OrderStore, OtpAttempt, ProductStore, RepositoryError, StatusUpdate, UserStore};
use crate::models::{
    AdminOrder, CustomerSummary, DailyRevenue, NewProduct, Order, PendingRegistration, Product,
    SalesTotals, User,
};

struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Default)]
struct State {
    users: BTreeMap<i32, StoredUser>,
    products: BTreeMap<i32, Product>,
    orders: BTreeMap<i32, Order>,
    next_user_id: i32,
    next_product_id: i32,
    next_order_id: i32,
}

impl State {
    fn user_by_email(&self, email: &Email) -> Option<&StoredUser> {
        self.users.values().find(|stored| &stored.user.email == email)
    }

    fn user_by_email_mut(&mut self, email: &Email) -> Option<&mut StoredUser> {
        self.users
            .values_mut()
            .find(|stored| &stored.user.email == email)
    }

    fn customer(&self, user_id: Option<UserId>) -> Option<CustomerSummary> {
        let stored = self.users.get(&user_id?.as_i32())?;
        Some(CustomerSummary {
            name: stored.user.name.to_string(),
            email: stored.user.email.clone(),
            phone: stored.user.phone.clone(),
        })
    }

    fn with_customer(&self, order: &Order) -> AdminOrder {
        AdminOrder {
            order: order.clone(),
            customer: self.customer(order.user_id),
        }
    }

    /// Orders sorted newest first.
    fn newest_first(&self) -> Vec<&Order> {
        let mut orders: Vec<&Order> = self.orders.values().collect();
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.id.as_i32().cmp(&a.id.as_i32()))
        });
        orders
    }

    fn insert_product(&mut self, product: &NewProduct) -> Product {
        self.next_product_id += 1;
        let created = Product {
            id: ProductId::new(self.next_product_id),
            name: product.name.clone(),
            price: product.price,
            category: product.category.clone(),
            image: product.image.clone(),
            description: product.description.clone(),
            is_available: true,
        };
        self.products.insert(self.next_product_id, created.clone());
        created
    }
}

/// Storage held entirely in process memory.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move an order's creation time, for analytics fixtures.
    pub async fn backdate_order(&self, id: OrderId, created_at: DateTime<Utc>) {
        if let Some(order) = self.state.write().await.orders.get_mut(&id.as_i32()) {
            order.created_at = created_at;
        }
    }

    /// Remove an account. Its orders stay, detached from the account.
    pub async fn delete_user(&self, id: UserId) -> bool {
        let mut state = self.state.write().await;
        if state.users.remove(&id.as_i32()).is_none() {
            return false;
        }
        for order in state.orders.values_mut() {
            if order.user_id == Some(id) {
                order.user_id = None;
            }
        }
        true
    }

    /// The stored password hash for an account.
    pub async fn password_hash(&self, email: &Email) -> Option<String> {
        self.state
            .read()
            .await
            .user_by_email(email)
            .map(|stored| stored.password_hash.clone())
    }
}

/// Revenue sums past the [`Decimal`] range fail like a numeric decode would
/// in `PostgreSQL`.
fn add_revenue(sum: Decimal, amount: Decimal) -> Result<Decimal, RepositoryError> {
    sum.checked_add(amount)
        .ok_or_else(|| RepositoryError::DataCorruption("revenue exceeds decimal range".into()))
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .state
            .read()
            .await
            .user_by_email(email)
            .map(|stored| stored.user.clone()))
    }

    async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        Ok(self
            .state
            .read()
            .await
            .user_by_email(email)
            .map(|stored| (stored.user.clone(), stored.password_hash.clone())))
    }

    async fn upsert_pending(
        &self,
        registration: &PendingRegistration,
    ) -> Result<User, RepositoryError> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        if let Some(stored) = state.user_by_email_mut(&registration.email) {
            if stored.user.is_verified() {
                return Err(RepositoryError::Conflict(
                    "email already registered".to_owned(),
                ));
            }
            stored.user.name = registration.name.clone();
            stored.user.phone = registration.phone.clone();
            stored.user.verification = VerificationState::Pending(registration.otp.clone());
            stored.user.updated_at = now;
            stored.password_hash.clone_from(&registration.password_hash);
            return Ok(stored.user.clone());
        }

        state.next_user_id += 1;
        let id = state.next_user_id;
        let user = User {
            id: UserId::new(id),
            name: registration.name.clone(),
            email: registration.email.clone(),
            phone: registration.phone.clone(),
            role: Role::Customer,
            verification: VerificationState::Pending(registration.otp.clone()),
            created_at: now,
            updated_at: now,
        };
        state.users.insert(
            id,
            StoredUser {
                user: user.clone(),
                password_hash: registration.password_hash.clone(),
            },
        );
        Ok(user)
    }

    async fn discard_pending(
        &self,
        email: &Email,
        code: &OtpCode,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        let target = state.user_by_email(email).and_then(|stored| {
            let pending = stored.user.verification.pending()?;
            (&pending.code == code).then_some(stored.user.id.as_i32())
        });

        Ok(target.is_some_and(|id| state.users.remove(&id).is_some()))
    }

    async fn consume_otp(
        &self,
        email: &Email,
        submitted: &str,
        now: DateTime<Utc>,
    ) -> Result<OtpAttempt, RepositoryError> {
        let mut state = self.state.write().await;
        let Some(stored) = state.user_by_email_mut(email) else {
            return Ok(OtpAttempt::UnknownEmail);
        };

        match stored.user.verification.check(submitted, now) {
            Ok(()) => {
                stored.user.verification = VerificationState::Verified;
                stored.user.updated_at = Utc::now();
                Ok(OtpAttempt::Verified(stored.user.clone()))
            }
            Err(OtpError::Expired) => {
                stored.user.verification = VerificationState::Cleared;
                stored.user.updated_at = Utc::now();
                Ok(OtpAttempt::Rejected(OtpError::Expired))
            }
            Err(e) => Ok(OtpAttempt::Rejected(e)),
        }
    }

    async fn set_role(&self, email: &Email, role: Role) -> Result<User, RepositoryError> {
        let mut state = self.state.write().await;
        match state.user_by_email_mut(email) {
            Some(stored) if stored.user.is_verified() => {
                stored.user.role = role;
                stored.user.updated_at = Utc::now();
                Ok(stored.user.clone())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.state.read().await.products.values().cloned().collect())
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        Ok(self.state.write().await.insert_product(product))
    }

    async fn create_many(&self, products: &[NewProduct]) -> Result<Vec<Product>, RepositoryError> {
        let mut state = self.state.write().await;
        Ok(products.iter().map(|p| state.insert_product(p)).collect())
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        Ok(self
            .state
            .write()
            .await
            .products
            .remove(&id.as_i32())
            .is_some())
    }

    async fn toggle_availability(
        &self,
        id: ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut state = self.state.write().await;
        Ok(state.products.get_mut(&id.as_i32()).map(|product| {
            product.is_available = !product.is_available;
            product.clone()
        }))
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create(&self, user_id: UserId, order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut state = self.state.write().await;
        state.next_order_id += 1;
        let id = state.next_order_id;
        let now = Utc::now();
        let created = Order {
            id: OrderId::new(id),
            user_id: Some(user_id),
            items: order.items.clone(),
            total_amount: order.total_amount,
            address: order.address.clone(),
            table_no: order.table_no.clone(),
            status: OrderStatus::Placed,
            created_at: now,
            updated_at: now,
        };
        state.orders.insert(id, created.clone());
        Ok(created)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.state.read().await.orders.get(&id.as_i32()).cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .newest_first()
            .into_iter()
            .filter(|order| order.user_id == Some(user_id))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<AdminOrder>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .newest_first()
            .into_iter()
            .map(|order| state.with_customer(order))
            .collect())
    }

    async fn update_status(
        &self,
        id: OrderId,
        to: OrderStatus,
        allowed_from: &[OrderStatus],
    ) -> Result<StatusUpdate, RepositoryError> {
        let mut state = self.state.write().await;
        let Some(order) = state.orders.get_mut(&id.as_i32()) else {
            return Ok(StatusUpdate::NotFound);
        };
        if !allowed_from.contains(&order.status) {
            return Ok(StatusUpdate::Rejected {
                current: order.status,
            });
        }
        order.status = to;
        order.updated_at = Utc::now();
        Ok(StatusUpdate::Updated(order.clone()))
    }

    async fn sales_totals(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<SalesTotals, RepositoryError> {
        let state = self.state.read().await;
        state
            .orders
            .values()
            .filter(|order| since.is_none_or(|since| order.created_at >= since))
            .try_fold(SalesTotals::default(), |totals, order| {
                Ok::<_, RepositoryError>(SalesTotals {
                    revenue: add_revenue(totals.revenue, order.total_amount)?,
                    orders: totals.orders + 1,
                })
            })
    }

    async fn daily_revenue(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<DailyRevenue>, RepositoryError> {
        let state = self.state.read().await;
        let mut days: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for order in state.orders.values().filter(|o| o.created_at >= since) {
            let day = days.entry(order.created_at.date_naive()).or_default();
            *day = add_revenue(*day, order.total_amount)?;
        }
        Ok(days
            .into_iter()
            .map(|(day, daily_revenue)| DailyRevenue { day, daily_revenue })
            .collect())
    }

    async fn recent_with_status(
        &self,
        status: OrderStatus,
        limit: u32,
    ) -> Result<Vec<AdminOrder>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .newest_first()
            .into_iter()
            .filter(|order| order.status == status)
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .map(|order| state.with_customer(order))
            .collect())
    }
}
