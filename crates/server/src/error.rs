//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Every error response is JSON shaped as `{ "error": <kind>, "msg": <message> }`.
//! Server-side failures get a generic message; the internal description travels
//! in an [`ErrorDetail`] response extension that only the development-mode
//! [`error_detail_middleware`](crate::middleware::error_detail_middleware)
//! writes into the body.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use bakehouse_core::{NameError, OtpError, PasswordPolicyError};

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::{CatalogError, OrderError};

/// Application-level error type for the ordering API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Signup, verification or sign-in failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Menu operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Order operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing, invalid or expired token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Valid token without the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Internal description of a failed request, attached to the response.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub kind: &'static str,
    pub msg: String,
    pub detail: String,
}

struct Classified {
    status: StatusCode,
    kind: &'static str,
    msg: String,
}

impl Classified {
    fn new(status: StatusCode, kind: &'static str, msg: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            msg: msg.into(),
        }
    }

    fn validation(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation", msg)
    }

    fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", msg)
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            "Internal server error",
        )
    }
}

impl AppError {
    fn classify(&self) -> Classified {
        match self {
            Self::Database(_) | Self::Internal(_) => Classified::internal(),
            Self::Auth(err) => classify_auth(err),
            Self::Catalog(err) => match err {
                CatalogError::Invalid(e) => Classified::validation(e.to_string()),
                CatalogError::InvalidItem { .. } => Classified::validation(err.to_string()),
                CatalogError::Empty => Classified::validation("No products supplied"),
                CatalogError::NotFound => Classified::not_found("Product not found"),
                CatalogError::Repository(_) => Classified::internal(),
            },
            Self::Order(err) => match err {
                OrderError::Invalid(e) => Classified::validation(e.to_string()),
                OrderError::InvalidStatus(_) => Classified::validation("Invalid Status Value"),
                OrderError::IllegalTransition(e) => {
                    Classified::new(StatusCode::CONFLICT, "illegal_transition", e.to_string())
                }
                OrderError::NotFound => Classified::not_found("Order not found"),
                OrderError::Repository(_) => Classified::internal(),
            },
            Self::NotFound(msg) => Classified::not_found(msg.as_str()),
            Self::Unauthorized(msg) => {
                Classified::new(StatusCode::UNAUTHORIZED, "unauthorized", msg.as_str())
            }
            Self::Forbidden(msg) => Classified::new(StatusCode::FORBIDDEN, "forbidden", msg.as_str()),
            Self::BadRequest(msg) => Classified::validation(msg.as_str()),
        }
    }
}

fn classify_auth(err: &AuthError) -> Classified {
    match err {
        AuthError::InvalidEmail(_) => Classified::validation("Invalid email format"),
        AuthError::InvalidName(NameError::TooShort) => Classified::validation("Name too short"),
        AuthError::InvalidName(NameError::TooLong) => Classified::validation("Name too long"),
        AuthError::InvalidPhone(_) => Classified::validation("Invalid Indian phone number"),
        AuthError::WeakPassword(PasswordPolicyError::TooShort) => {
            Classified::validation("Password min 6 chars")
        }
        AuthError::WeakPassword(PasswordPolicyError::TooLong) => {
            Classified::validation("Password max 30 chars")
        }
        AuthError::AlreadyRegistered => {
            Classified::new(StatusCode::CONFLICT, "conflict", "User already exists")
        }
        AuthError::DeliveryFailed(_) => Classified::new(
            StatusCode::BAD_GATEWAY,
            "delivery_failed",
            "Could not send the OTP email. Please try again.",
        ),
        AuthError::SignupNotFound => {
            Classified::validation("No signup found for this email. Please signup again.")
        }
        AuthError::Otp(otp) => Classified::validation(match otp {
            OtpError::AlreadyVerified => "Email already verified. Please login.",
            OtpError::NoPendingCode => "No OTP found. Please request a new OTP by signing up again.",
            OtpError::Expired => "OTP has expired. Please signup again to receive a new OTP.",
            OtpError::Mismatch => "Invalid OTP",
        }),
        AuthError::InvalidCredentials => Classified::new(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "Invalid Credentials",
        ),
        AuthError::Token(_) | AuthError::Repository(_) | AuthError::PasswordHash => {
            Classified::internal()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let Classified { status, kind, msg } = self.classify();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let detail = ErrorDetail {
            kind,
            msg: msg.clone(),
            detail: self.to_string(),
        };

        let mut response = (status, Json(json!({ "error": kind, "msg": msg }))).into_response();
        response.extensions_mut().insert(detail);
        response
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Called once a request's token has been verified so errors are associated
/// with the account.
pub fn set_sentry_user(user_id: &impl ToString, role: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
        scope.set_tag("role", role);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use bakehouse_core::{OrderStatus, TransitionError};

    use super::*;
    use crate::services::notifier::NotifyError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(
            get_status(AuthError::AlreadyRegistered.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AuthError::Otp(OtpError::Expired).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AuthError::SignupNotFound.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AuthError::DeliveryFailed(NotifyError::Refused("refused".to_owned())).into()),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_order_error_status_codes() {
        assert_eq!(get_status(OrderError::NotFound.into()), StatusCode::NOT_FOUND);
        assert_eq!(
            get_status(
                OrderError::IllegalTransition(TransitionError {
                    from: OrderStatus::Delivered,
                    to: OrderStatus::Preparing,
                })
                .into()
            ),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(CatalogError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_otp_messages_are_user_facing() {
        let body = body_json(AppError::from(AuthError::Otp(OtpError::Mismatch)).into_response()).await;
        assert_eq!(body["error"], "validation");
        assert_eq!(body["msg"], "Invalid OTP");

        let body = body_json(AppError::from(AuthError::Otp(OtpError::Expired)).into_response()).await;
        assert_eq!(
            body["msg"],
            "OTP has expired. Please signup again to receive a new OTP."
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "users.phone column held 'abc'".to_string(),
        ));
        let response = err.into_response();

        let detail = response.extensions().get::<ErrorDetail>().cloned().unwrap();
        assert!(detail.detail.contains("users.phone"));

        let body = body_json(response).await;
        assert_eq!(body["error"], "internal");
        assert_eq!(body["msg"], "Internal server error");
        assert!(body.get("detail").is_none());
    }
}
