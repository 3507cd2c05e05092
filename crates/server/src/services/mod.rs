//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Signup with emailed one-time codes, sign-in, session tokens
//! - `catalog` - Menu management
//! - `orders` - Order placement and the status lifecycle
//! - `analytics` - Dashboard sales figures
//! - `notifier` / `email` - Delivery of verification codes
//!
//! Services borrow their stores from [`crate::state::AppState`] for the
//! length of one request.

pub mod analytics;
pub mod auth;
pub mod catalog;
pub mod email;
pub mod notifier;
pub mod orders;

pub use analytics::{AnalyticsService, AnalyticsSnapshot};
pub use auth::{AuthService, SessionIssuer};
pub use catalog::{CatalogError, CatalogService};
pub use email::EmailService;
pub use notifier::{LogNotifier, NotifyError, OtpNotifier, RecordingNotifier};
pub use orders::{OrderError, OrderService};
