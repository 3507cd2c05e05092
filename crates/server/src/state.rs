//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::Stores;
use crate::services::auth::TokenError;
use crate::services::{
    AnalyticsService, AuthService, CatalogService, OrderService, OtpNotifier, SessionIssuer,
};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like storage, the mailer and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    stores: Stores,
    notifier: Arc<dyn OtpNotifier>,
    sessions: SessionIssuer,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `stores` - Storage backend for accounts, menu and orders
    /// * `notifier` - Delivery of verification codes
    ///
    /// # Errors
    ///
    /// Returns an error if the token secret is rejected as an HMAC key.
    pub fn new(
        config: AppConfig,
        stores: Stores,
        notifier: Arc<dyn OtpNotifier>,
    ) -> Result<Self, TokenError> {
        let sessions = SessionIssuer::new(&config.token_secret, config.token_ttl)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                stores,
                notifier,
                sessions,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn stores(&self) -> &Stores {
        &self.inner.stores
    }

    /// Get a reference to the session token issuer.
    #[must_use]
    pub fn sessions(&self) -> &SessionIssuer {
        &self.inner.sessions
    }

    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(
            self.inner.stores.users.as_ref(),
            self.inner.notifier.as_ref(),
            &self.inner.sessions,
        )
    }

    #[must_use]
    pub fn catalog(&self) -> CatalogService<'_> {
        CatalogService::new(self.inner.stores.products.as_ref())
    }

    /// Order service using the configured transition policy.
    #[must_use]
    pub fn orders(&self) -> OrderService<'_> {
        OrderService::new(
            self.inner.stores.orders.as_ref(),
            self.inner.config.order_policy,
        )
    }

    #[must_use]
    pub fn analytics(&self) -> AnalyticsService<'_> {
        AnalyticsService::new(self.inner.stores.orders.as_ref())
    }
}
