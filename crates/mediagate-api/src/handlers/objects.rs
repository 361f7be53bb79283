//! Private object serving.
//!
//! Objects under the private root are only reachable through this
//! authenticated route and are always served with `private` cache visibility
//! so shared caches never store them.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
};
use mediagate_core::{AppError, Visibility};
use mediagate_storage::StorageError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::media::serve_object;
use crate::state::ServingState;

#[utoipa::path(
    get,
    path = "/objects/{path}",
    tag = "serving",
    params(
        ("path" = String, Path, description = "Private object identifier")
    ),
    responses(
        (status = 200, description = "Object content"),
        (status = 401, description = "Missing or invalid service token", body = ErrorResponse),
        (status = 404, description = "Object not found", body = ErrorResponse)
    )
)]
pub async fn serve_private_object(
    State(serving): State<ServingState>,
    Path(path): Path<String>,
    request_headers: HeaderMap,
) -> Result<Response, HttpAppError> {
    let logical = format!("/objects/{}", path.trim_start_matches('/'));
    let object = serving.resolver.resolve_private(&logical).map_err(|e| match e {
        StorageError::InvalidPath(msg) => HttpAppError(AppError::InvalidRequest(msg)),
        other => HttpAppError::from(other),
    })?;

    serve_object(
        serving.storage.as_ref(),
        &object,
        Visibility::Private,
        &request_headers,
    )
    .await
}
