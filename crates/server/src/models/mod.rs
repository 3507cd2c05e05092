//! Domain models for the ordering API.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`]. Wire shapes for JSON responses live next to them.

pub mod order;
pub mod product;
pub mod user;

pub use order::{AdminOrder, CustomerSummary, DailyRevenue, Order, SalesTotals};
pub use product::{NewProduct, Product, ProductValidationError};
pub use user::{PendingRegistration, PublicProfile, User};
