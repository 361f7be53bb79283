//! Liveness, readiness, and storage diagnostics.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use mediagate_storage::{parse_object_path, run_diagnostics};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessResponse {
    pub status: String,
    pub storage: String,
}

/// Process liveness. Never touches storage.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    responses((status = 200, description = "Process is running"))
)]
pub async fn live() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "alive" }))
}

/// Readiness: a cheap probe that the primary bucket is reachable.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Storage reachable", body = ReadinessResponse),
        (status = 503, description = "Storage unreachable", body = ReadinessResponse)
    )
)]
pub async fn ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut response = ReadinessResponse {
        status: "ready".to_string(),
        storage: "unknown".to_string(),
    };
    let mut overall_ready = true;

    let bucket = parse_object_path(state.resolver.primary_public_root())
        .map(|o| o.bucket)
        .unwrap_or_default();

    match tokio::time::timeout(PROBE_TIMEOUT, state.storage.bucket_exists(&bucket)).await {
        Ok(Ok(true)) => {
            response.storage = "ready".to_string();
        }
        Ok(Ok(false)) => {
            tracing::error!(bucket = %bucket, "readiness probe: bucket missing");
            response.storage = "bucket_missing".to_string();
            overall_ready = false;
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, bucket = %bucket, "readiness probe failed");
            response.storage = format!("not_ready: {}", e);
            overall_ready = false;
        }
        Err(_) => {
            tracing::error!(bucket = %bucket, "readiness probe timed out");
            response.storage = "timeout".to_string();
            overall_ready = false;
        }
    }

    let status_code = if overall_ready {
        StatusCode::OK
    } else {
        response.status = "not_ready".to_string();
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}

/// Full storage diagnostics: the write, read-back, delete round trip.
/// Re-runs the startup probe on demand.
#[utoipa::path(
    get,
    path = "/health/storage",
    tag = "health",
    responses(
        (status = 200, description = "Round trip succeeded"),
        (status = 503, description = "One or more probes failed; body lists issues and recommendations")
    )
)]
pub async fn storage(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let root = state.resolver.primary_public_root().to_string();
    let report = run_diagnostics(state.storage.as_ref(), &root).await;

    let status_code = if report.healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(report))
}
