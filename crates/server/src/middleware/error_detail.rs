//! Development-only error details.
//!
//! Error responses carry an [`ErrorDetail`] extension with the internal
//! description of the failure. In development this middleware rewrites the
//! JSON body to include it as `detail`; in production the extension is
//! dropped and clients only see the generic message.

use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::ErrorDetail;
use crate::state::AppState;

/// Expose internal error descriptions outside production.
pub async fn error_detail_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let Some(detail) = response.extensions_mut().remove::<ErrorDetail>() else {
        return response;
    };
    if !state.config().environment.is_development() {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    // The old body's length no longer applies
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);

    let body = Json(json!({
        "error": detail.kind,
        "msg": detail.msg,
        "detail": detail.detail,
    }));
    (parts, body).into_response()
}
