//! Presigned direct-upload grants.
//!
//! The grant authorizes exactly one PUT of one key for a bounded window. The
//! declared size and type are validated here, but the backend does not
//! re-check them on the direct PUT; uploads that must be size-guaranteed use
//! the gateway route instead.

use axum::{extract::State, response::IntoResponse, Extension, Json};
use mediagate_core::{AppError, UploadCategory};
use mediagate_storage::keys;
use mediagate_storage::GrantMethod;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::CallerIdentity;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::GrantState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlRequest {
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
    /// One of `product`, `profile`, `post`.
    pub category: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    pub upload_url: String,
    pub public_url: String,
    pub object_path: String,
    pub expires_in: u64,
}

/// Issue a presigned URL for a direct-to-storage upload.
#[utoipa::path(
    post,
    path = "/upload-url",
    tag = "uploads",
    request_body = UploadUrlRequest,
    responses(
        (status = 200, description = "Signed upload grant", body = UploadUrlResponse),
        (status = 400, description = "Size or type violates the category policy", body = ErrorResponse),
        (status = 401, description = "Missing or invalid service token", body = ErrorResponse),
        (status = 413, description = "Declared size exceeds the category cap", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip_all,
    fields(
        category = %request.category,
        file_size = request.file_size,
        operation = "issue_upload_grant"
    )
)]
pub async fn issue_upload_url(
    State(grants): State<GrantState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(request): Json<UploadUrlRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let category: UploadCategory = request.category.parse().map_err(|_| {
        HttpAppError(AppError::InvalidRequest(format!(
            "Unknown upload category {:?}",
            request.category
        )))
    })?;

    if request.file_size == 0 {
        return Err(HttpAppError(AppError::InvalidRequest(
            "fileSize must be positive".to_string(),
        )));
    }

    let limit = grants.policy.max_bytes(category);
    if request.file_size > limit {
        return Err(HttpAppError(AppError::PayloadTooLarge {
            declared: request.file_size,
            limit,
        }));
    }

    if !grants.policy.is_type_allowed(category, &request.file_type) {
        return Err(HttpAppError(AppError::InvalidRequest(format!(
            "Content type {:?} is not allowed for category {}",
            request.file_type, category
        ))));
    }

    let object_name = keys::generate_object_name(category, &request.file_name);
    let relative = format!("{}/{}", category, object_name);
    let target = grants
        .resolver
        .public_upload_target(&relative)
        .map_err(HttpAppError::from)?;

    let grant = grants
        .issuer
        .issue(&target, GrantMethod::Put)
        .await
        .map_err(HttpAppError::from)?;

    tracing::info!(
        bucket = %target.bucket,
        key = %target.key,
        caller = %caller.as_str(),
        expires_in = grant.ttl_secs(),
        "issued upload grant"
    );

    let expires_in = grant.ttl_secs();
    Ok(Json(UploadUrlResponse {
        upload_url: grant.url,
        public_url: format!("/media/{}", relative),
        object_path: target.object_path(),
        expires_in,
    }))
}
