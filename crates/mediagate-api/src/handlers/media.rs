//! Public media serving with conditional and range support.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use futures::StreamExt;
use mediagate_core::{AppError, CacheDirective, ObjectRef, Visibility};
use mediagate_storage::{Storage, StorageError};

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::ServingState;

/// Only video honors range requests; images and documents are always served
/// whole.
fn supports_ranges(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
        .starts_with("video/")
}

/// Result of reading a `Range` header against a known object size.
#[derive(Debug, PartialEq, Eq)]
enum ParsedRange {
    /// No usable range; serve the whole object with `200`.
    Full,
    /// A satisfiable window, inclusive end.
    Slice { start: u64, end: u64 },
    /// Syntactically valid but outside the object; answer `416`.
    Unsatisfiable,
}

/// Parse a single-range `bytes=` header. Multi-range requests and malformed
/// values fall back to a full response, which HTTP permits for any range
/// request.
fn parse_range(raw: &str, size: u64) -> ParsedRange {
    let Some(spec) = raw.trim().strip_prefix("bytes=") else {
        return ParsedRange::Full;
    };
    if spec.contains(',') {
        return ParsedRange::Full;
    }

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return ParsedRange::Full;
    };
    let start_str = start_str.trim();
    let end_str = end_str.trim();

    if start_str.is_empty() {
        // Suffix form: the last N bytes.
        let Ok(suffix) = end_str.parse::<u64>() else {
            return ParsedRange::Full;
        };
        if suffix == 0 || size == 0 {
            return ParsedRange::Unsatisfiable;
        }
        let start = size.saturating_sub(suffix);
        return ParsedRange::Slice {
            start,
            end: size - 1,
        };
    }

    let Ok(start) = start_str.parse::<u64>() else {
        return ParsedRange::Full;
    };
    if start >= size {
        return ParsedRange::Unsatisfiable;
    }

    if end_str.is_empty() {
        return ParsedRange::Slice {
            start,
            end: size - 1,
        };
    }

    let Ok(end) = end_str.parse::<u64>() else {
        return ParsedRange::Full;
    };
    if end < start {
        return ParsedRange::Full;
    }
    ParsedRange::Slice {
        start,
        end: end.min(size - 1),
    }
}

/// Weak comparison against an `If-None-Match` header value.
fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    if_none_match.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.trim_start_matches("W/") == etag
    })
}

fn internal(e: impl std::fmt::Display) -> HttpAppError {
    HttpAppError(AppError::BackendFailure(e.to_string()))
}

/// Serve one object with caching, conditional, and (for video) range
/// semantics. Shared by the public and private serving routes.
pub(crate) async fn serve_object(
    storage: &dyn Storage,
    object: &ObjectRef,
    visibility: Visibility,
    request_headers: &HeaderMap,
) -> Result<Response, HttpAppError> {
    let stat = match storage.stat(object).await {
        Ok(stat) => stat,
        Err(StorageError::NotFound(_)) => {
            return Err(HttpAppError(AppError::NotFound(
                "Object not found".to_string(),
            )));
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                bucket = %object.bucket,
                key = %object.key,
                "failed to stat object"
            );
            return Err(internal(e));
        }
    };

    let content_type = stat
        .content_type
        .clone()
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let etag = format!(
        "\"{:x}-{:x}\"",
        stat.last_modified.timestamp_millis(),
        stat.size
    );
    let cache_control = CacheDirective::derive(&content_type, visibility).render();
    let ranged = supports_ranges(&content_type);

    // Base headers are identical on every branch so a 304 carries the same
    // caching metadata as a 200.
    let base = || {
        let mut builder = Response::builder()
            .header(header::CONTENT_TYPE, &content_type)
            .header(header::CACHE_CONTROL, &cache_control)
            .header(header::ETAG, &etag);
        if ranged {
            builder = builder.header(header::ACCEPT_RANGES, "bytes");
        }
        builder
    };

    let not_modified = request_headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|inm| etag_matches(inm, &etag));
    if not_modified {
        return base()
            .status(StatusCode::NOT_MODIFIED)
            .body(Body::empty())
            .map_err(internal);
    }

    if ranged {
        let range_header = request_headers
            .get(header::RANGE)
            .and_then(|v| v.to_str().ok());
        if let Some(raw) = range_header {
            match parse_range(raw, stat.size) {
                ParsedRange::Slice { start, end } => {
                    let stream = storage
                        .read_stream(object, Some(start..end + 1))
                        .await
                        .map_err(internal)?;
                    let body_stream =
                        stream.map(|result| result.map_err(std::io::Error::other));
                    return base()
                        .status(StatusCode::PARTIAL_CONTENT)
                        .header(
                            header::CONTENT_RANGE,
                            format!("bytes {}-{}/{}", start, end, stat.size),
                        )
                        .header(header::CONTENT_LENGTH, (end - start + 1).to_string())
                        .body(Body::from_stream(body_stream))
                        .map_err(internal);
                }
                ParsedRange::Unsatisfiable => {
                    return base()
                        .status(StatusCode::RANGE_NOT_SATISFIABLE)
                        .header(header::CONTENT_RANGE, format!("bytes */{}", stat.size))
                        .body(Body::empty())
                        .map_err(internal);
                }
                ParsedRange::Full => {}
            }
        }
    }

    let stream = storage.read_stream(object, None).await.map_err(internal)?;
    let body_stream = stream.map(|result| result.map_err(std::io::Error::other));
    base()
        .status(StatusCode::OK)
        .header(header::CONTENT_LENGTH, stat.size.to_string())
        .body(Body::from_stream(body_stream))
        .map_err(internal)
}

#[utoipa::path(
    get,
    path = "/media/{path}",
    tag = "serving",
    params(
        ("path" = String, Path, description = "Logical media path, e.g. product/1700000000000-product-a1b2c3d4.png")
    ),
    responses(
        (status = 200, description = "Object content"),
        (status = 206, description = "Partial content for a video range request"),
        (status = 304, description = "Not modified"),
        (status = 404, description = "No search root holds the object", body = ErrorResponse),
        (status = 416, description = "Requested range outside the object")
    )
)]
pub async fn serve_media(
    State(serving): State<ServingState>,
    Path(path): Path<String>,
    request_headers: HeaderMap,
) -> Result<Response, HttpAppError> {
    let object = serving
        .resolver
        .resolve_public(serving.storage.as_ref(), &path)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| HttpAppError(AppError::NotFound("Object not found".to_string())))?;

    serve_object(
        serving.storage.as_ref(),
        &object,
        Visibility::Public,
        &request_headers,
    )
    .await
}
