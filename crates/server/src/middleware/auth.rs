//! Authentication extractors.
//!
//! Session tokens travel in the `x-auth-token` request header. Verification is
//! stateless: signature and expiry are checked against the server secret, and
//! nothing is looked up in storage.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use chrono::Utc;

use crate::error::{AppError, set_sentry_user};
use crate::services::auth::{Claims, TokenError};
use crate::state::AppState;

/// The HTTP header carrying the session token.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Extractor that requires a valid session token.
///
/// # Example
///
/// ```rust,ignore
/// async fn my_orders(RequireAuth(claims): RequireAuth) -> impl IntoResponse {
///     format!("orders for {}", claims.sub)
/// }
/// ```
pub struct RequireAuth(pub Claims);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(AUTH_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::Unauthorized("No token, access denied".to_string()))?;

        let claims = state
            .sessions()
            .verify(token, Utc::now())
            .map_err(|err| {
                tracing::debug!(error = %err, "Rejected session token");
                match err {
                    TokenError::Expired => {
                        AppError::Unauthorized("Token expired, please login again".to_string())
                    }
                    _ => AppError::Unauthorized("Invalid token".to_string()),
                }
            })?;

        set_sentry_user(&claims.sub, claims.role.as_str());

        Ok(Self(claims))
    }
}

/// Extractor that requires a valid session token with the admin role.
///
/// Returns 401 like [`RequireAuth`] when the token is missing or bad, and
/// 403 when the account is not an admin.
pub struct RequireAdmin(pub Claims);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(claims) = RequireAuth::from_request_parts(parts, state).await?;

        if !claims.is_admin() {
            tracing::info!(user_id = %claims.sub, "Admin route refused");
            return Err(AppError::Forbidden("Access denied! Admins only.".to_string()));
        }

        Ok(Self(claims))
    }
}
