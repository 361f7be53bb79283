//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must
//! implement, plus the error and value types shared by every backend.

use std::ops::Range;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use mediagate_core::{ObjectRef, StorageBackend};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid object path: {0}")]
    InvalidPath(String),

    #[error("Write aborted: {0}")]
    WriteAborted(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunked object content; every backend yields and accepts this shape.
pub type ByteStream = Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send>>;

/// Method a signed grant is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GrantMethod {
    Get,
    Put,
    Delete,
}

impl GrantMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantMethod::Get => "GET",
            GrantMethod::Put => "PUT",
            GrantMethod::Delete => "DELETE",
        }
    }
}

/// Object metadata as reported by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectStat {
    pub size: u64,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub last_modified: DateTime<Utc>,
}

/// Storage abstraction trait
///
/// All storage backends (S3, in-memory) must implement this trait. Callers
/// address objects by [`ObjectRef`] and never see backend wire formats:
/// backend "not found" responses are translated into
/// [`StorageError::NotFound`] so resolution and diagnostics can branch on
/// absence without coupling to a backend.
///
/// Write operations are atomic from the caller's perspective: a write either
/// fully succeeds (object readable immediately after) or fully fails (no
/// partial object visible). Streamed writes go through a buffered multipart
/// writer whose parts stay invisible until finalized; aborting discards them.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Cheap existence check (HEAD).
    async fn exists(&self, object: &ObjectRef) -> StorageResult<bool>;

    /// Object metadata; `NotFound` when the object is absent.
    async fn stat(&self, object: &ObjectRef) -> StorageResult<ObjectStat>;

    /// Read object content as a chunk stream. `range` selects a byte window
    /// (end-exclusive); `None` reads the whole object.
    async fn read_stream(
        &self,
        object: &ObjectRef,
        range: Option<Range<u64>>,
    ) -> StorageResult<ByteStream>;

    /// Consume `body` chunk-by-chunk into the object, committing only when
    /// the stream ends cleanly. A stream item carrying an error aborts the
    /// write, discards everything written so far, and returns that error.
    /// Returns the number of bytes written on commit.
    async fn put_stream(
        &self,
        object: &ObjectRef,
        content_type: &str,
        body: ByteStream,
    ) -> StorageResult<u64>;

    /// Whole-object write in a single call.
    async fn save(&self, object: &ObjectRef, content_type: &str, data: Bytes) -> StorageResult<()>;

    /// Delete an object. Returns whether the backend reported it existed
    /// (S3-compatible backends may report success for absent keys).
    async fn delete(&self, object: &ObjectRef) -> StorageResult<bool>;

    /// Produce a time-bounded URL scoped to one method on one object.
    /// Expiry is enforced by the backend, not by this process.
    async fn signed_url(
        &self,
        object: &ObjectRef,
        method: GrantMethod,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// List up to `limit` objects below `prefix` in a bucket.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        limit: usize,
    ) -> StorageResult<Vec<ObjectRef>>;

    /// Whether a bucket is reachable with the configured credentials.
    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
