//! Size-guaranteed streaming upload.
//!
//! Unlike the presigned route, this endpoint proxies the bytes and enforces
//! the declared length itself. All metadata rides in headers so validation
//! finishes before the first body byte is read.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    Extension, Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::CallerIdentity;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::gateway::UploadDescriptor;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecureUploadResponse {
    pub success: bool,
    pub public_url: String,
    pub size: u64,
    pub content_type: String,
    /// Profile uploads only: `true` when the variant pipeline was unavailable
    /// and only the original was stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<bool>,
}

/// Stream an upload through the gateway.
#[utoipa::path(
    post,
    path = "/secure-upload",
    tag = "uploads",
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    params(
        ("x-file-name" = Option<String>, Header, description = "Original file name"),
        ("x-file-type" = String, Header, description = "Declared MIME type"),
        ("x-image-type" = String, Header, description = "Upload category: product, profile or post"),
        ("x-user-id" = Option<String>, Header, description = "End user the upload belongs to")
    ),
    responses(
        (status = 200, description = "Upload committed", body = SecureUploadResponse),
        (status = 400, description = "Policy violation or size mismatch", body = ErrorResponse),
        (status = 401, description = "Missing or invalid service token", body = ErrorResponse),
        (status = 411, description = "Content-Length header missing", body = ErrorResponse),
        (status = 413, description = "Declared size exceeds the category cap", body = ErrorResponse)
    )
)]
pub async fn secure_upload(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    headers: HeaderMap,
    body: Body,
) -> Result<impl IntoResponse, HttpAppError> {
    let descriptor = UploadDescriptor::from_headers(&headers, caller.as_str(), &state.policy)
        .map_err(HttpAppError)?;

    let receipt = state
        .gateway
        .handle_upload(descriptor, body.into_data_stream())
        .await
        .map_err(HttpAppError)?;

    Ok(Json(SecureUploadResponse {
        success: true,
        public_url: receipt.public_url,
        size: receipt.size,
        content_type: receipt.content_type,
        degraded: receipt.degraded,
    }))
}
