//! API constants
//!
//! Upload metadata travels in headers so requests can be rejected before any
//! body byte is read. `X-Image-Type` carries the upload category; the name
//! predates non-image categories and is kept for client compatibility.

/// Client-supplied file name for an upload.
pub const HEADER_FILE_NAME: &str = "x-file-name";

/// Declared MIME type for an upload.
pub const HEADER_FILE_TYPE: &str = "x-file-type";

/// Upload category (`product`, `profile`, `post`).
pub const HEADER_UPLOAD_CATEGORY: &str = "x-image-type";

/// End-user identity forwarded by the calling service.
pub const HEADER_USER_ID: &str = "x-user-id";
