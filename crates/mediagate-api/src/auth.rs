//! Service-to-service authentication.
//!
//! Every protected route requires `Authorization: Bearer <token>` matching the
//! configured service token. The caller may also identify an end user through
//! the `x-user-id` header; that identity is attached to the request for
//! handlers that shard or attribute uploads per user.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use mediagate_core::AppError;
use subtle::ConstantTimeEq;

use crate::constants::HEADER_USER_ID;
use crate::error::HttpAppError;
use crate::state::AppState;

/// Identity the caller claims for this request. Service-originated requests
/// without an `x-user-id` header act as the service itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallerIdentity(pub String);

impl CallerIdentity {
    pub const SERVICE: &'static str = "service";

    pub fn from_headers(headers: &axum::http::HeaderMap) -> Self {
        let id = headers
            .get(HEADER_USER_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(Self::SERVICE);
        CallerIdentity(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    if !auth_header.starts_with("Bearer ") {
        return HttpAppError(AppError::Unauthorized(
            "Invalid authorization header format".to_string(),
        ))
        .into_response();
    }

    let token = &auth_header[7..]; // Remove "Bearer " prefix

    if !secure_compare(token, &state.config.service_token) {
        tracing::warn!("rejected request with invalid service token");
        return HttpAppError(AppError::Unauthorized(
            "Invalid service token".to_string(),
        ))
        .into_response();
    }

    let caller = CallerIdentity::from_headers(request.headers());
    request.extensions_mut().insert(caller);
    next.run(request).await
}
