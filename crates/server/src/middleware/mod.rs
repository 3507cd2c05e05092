//! HTTP middleware stack for the ordering API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction per route)
//! 2. `TraceLayer` (request span with a `request_id` field)
//! 3. Request ID (reuse or generate `x-request-id`)
//! 4. Error detail (development only)
//!
//! Authentication is not a layer: handlers opt in with the [`RequireAuth`]
//! and [`RequireAdmin`] extractors.

pub mod auth;
pub mod error_detail;
pub mod request_id;

pub use auth::{AUTH_TOKEN_HEADER, RequireAdmin, RequireAuth};
pub use error_detail::error_detail_middleware;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
