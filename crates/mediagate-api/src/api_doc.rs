//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;

/// Returns the OpenAPI spec served at `/api/openapi.json`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mediagate API",
        version = "0.1.0",
        description = "Object storage access gateway: presigned direct uploads, size-guaranteed streaming uploads, and cached media serving over multiple search roots."
    ),
    paths(
        // Uploads
        handlers::upload_url::issue_upload_url,
        handlers::secure_upload::secure_upload,
        // Serving
        handlers::media::serve_media,
        handlers::objects::serve_private_object,
        // Health
        handlers::health::live,
        handlers::health::ready,
        handlers::health::storage,
    ),
    components(
        schemas(
            handlers::upload_url::UploadUrlRequest,
            handlers::upload_url::UploadUrlResponse,
            handlers::secure_upload::SecureUploadResponse,
            handlers::health::ReadinessResponse,
            mediagate_core::UploadCategory,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "uploads", description = "Presigned upload grants and the streaming upload gateway"),
        (name = "serving", description = "Public media and private object serving"),
        (name = "health", description = "Liveness, readiness, and storage diagnostics")
    )
)]
pub struct ApiDoc;
