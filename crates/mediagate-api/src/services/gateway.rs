//! Streaming upload gateway.
//!
//! Presigned direct-to-storage uploads cannot enforce a true server-side byte
//! count: the backend PUT has no length-range constraint, so a client can
//! declare a small size and send more. Every upload that must be
//! size-guaranteed goes through this gateway instead, which counts bytes as
//! they stream and commits only on an exact match with the declared length.
//!
//! Abort is signalled as a typed error pushed down the write channel; the
//! writer task reacts by discarding its multipart parts, and its join result
//! is the single place commit/abort is decided.

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use mediagate_core::{AppError, ObjectRef, UploadCategory, UploadPolicy};
use mediagate_storage::keys;
use mediagate_storage::{ByteStream, PathResolver, Storage, StorageError};
use tokio::sync::mpsc;

use crate::constants::{HEADER_FILE_NAME, HEADER_FILE_TYPE, HEADER_UPLOAD_CATEGORY};
use crate::services::avatar::{AvatarMedia, AvatarUploadOptions};

/// Channel depth between the inbound reader and the storage writer task.
/// Chunks forward as they arrive; this only smooths scheduling jitter.
const WRITE_CHANNEL_DEPTH: usize = 8;

/// Upload metadata, built entirely from request headers before any body byte
/// is read. Construction performs all policy validation, so a descriptor in
/// hand means the upload is admissible.
#[derive(Debug, Clone)]
pub struct UploadDescriptor {
    pub file_name: String,
    pub declared_len: u64,
    pub content_type: String,
    pub category: UploadCategory,
    pub caller: String,
}

impl UploadDescriptor {
    pub fn from_headers(
        headers: &HeaderMap,
        caller: &str,
        policy: &UploadPolicy,
    ) -> Result<Self, AppError> {
        let category: UploadCategory = header_str(headers, HEADER_UPLOAD_CATEGORY)
            .ok_or_else(|| {
                AppError::InvalidRequest(format!("Missing {} header", HEADER_UPLOAD_CATEGORY))
            })?
            .parse()
            .map_err(|e| AppError::InvalidRequest(format!("{}", e)))?;

        let content_type = header_str(headers, HEADER_FILE_TYPE)
            .ok_or_else(|| {
                AppError::InvalidRequest(format!("Missing {} header", HEADER_FILE_TYPE))
            })?
            .to_string();

        let file_name = keys::sanitize_file_name(
            header_str(headers, HEADER_FILE_NAME).unwrap_or("file"),
        );

        let declared_len: u64 = headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::LengthRequired("Content-Length header is required".to_string())
            })?
            .parse()
            .map_err(|_| {
                AppError::LengthRequired("Content-Length header must be a byte count".to_string())
            })?;

        if declared_len == 0 {
            return Err(AppError::InvalidRequest(
                "Declared length must be positive".to_string(),
            ));
        }

        let limit = policy.max_bytes(category);
        if declared_len > limit {
            return Err(AppError::PayloadTooLarge {
                declared: declared_len,
                limit,
            });
        }

        if !policy.is_type_allowed(category, &content_type) {
            return Err(AppError::InvalidRequest(format!(
                "Content type {:?} is not allowed for category {}",
                content_type, category
            )));
        }

        Ok(UploadDescriptor {
            file_name,
            declared_len,
            content_type,
            category,
            caller: caller.to_string(),
        })
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Terminal result of one gateway upload. An upload that streams past its
/// declared length, or finishes short of it, never produces `Committed`.
#[derive(Debug)]
pub enum UploadOutcome {
    Committed { object: ObjectRef, bytes_written: u64 },
    Rejected { reason: AppError },
}

/// What a successful upload reports back to the caller.
#[derive(Debug)]
pub struct UploadReceipt {
    pub public_url: String,
    pub size: u64,
    pub content_type: String,
    /// Present for profile uploads: `true` when the variant pipeline was
    /// unavailable and only the original was stored.
    pub degraded: Option<bool>,
}

pub struct UploadGateway {
    storage: Arc<dyn Storage>,
    resolver: Arc<PathResolver>,
    avatars: Arc<dyn AvatarMedia>,
}

impl UploadGateway {
    pub fn new(
        storage: Arc<dyn Storage>,
        resolver: Arc<PathResolver>,
        avatars: Arc<dyn AvatarMedia>,
    ) -> Self {
        Self {
            storage,
            resolver,
            avatars,
        }
    }

    /// Run a validated upload to completion.
    ///
    /// Profile uploads buffer the (small, already capped) body and hand it to
    /// the avatar collaborator; every other category streams chunk-by-chunk
    /// into storage.
    pub async fn handle_upload<S, E>(
        &self,
        descriptor: UploadDescriptor,
        body: S,
    ) -> Result<UploadReceipt, AppError>
    where
        S: Stream<Item = Result<Bytes, E>> + Send,
        E: std::fmt::Display,
    {
        match descriptor.category {
            UploadCategory::Profile => self.handle_avatar(descriptor, body).await,
            _ => self.handle_streamed(descriptor, body).await,
        }
    }

    async fn handle_streamed<S, E>(
        &self,
        descriptor: UploadDescriptor,
        body: S,
    ) -> Result<UploadReceipt, AppError>
    where
        S: Stream<Item = Result<Bytes, E>> + Send,
        E: std::fmt::Display,
    {
        let object_name = keys::generate_object_name(descriptor.category, &descriptor.file_name);
        let relative = format!("{}/{}", descriptor.category, object_name);
        let target = self
            .resolver
            .public_upload_target(&relative)
            .map_err(|e| AppError::InvalidRequest(e.to_string()))?;

        match self.stream_upload(&descriptor, &target, body).await {
            UploadOutcome::Committed {
                object,
                bytes_written,
            } => {
                tracing::info!(
                    bucket = %object.bucket,
                    key = %object.key,
                    category = %descriptor.category,
                    caller = %descriptor.caller,
                    size_bytes = bytes_written,
                    "upload committed"
                );
                Ok(UploadReceipt {
                    public_url: format!("/media/{}", relative),
                    size: bytes_written,
                    content_type: descriptor.content_type,
                    degraded: None,
                })
            }
            UploadOutcome::Rejected { reason } => Err(reason),
        }
    }

    /// Stream `body` into `target`, enforcing the declared length on every
    /// chunk. Always awaits the writer task before returning, so no error
    /// response can race an in-flight storage write.
    pub async fn stream_upload<S, E>(
        &self,
        descriptor: &UploadDescriptor,
        target: &ObjectRef,
        body: S,
    ) -> UploadOutcome
    where
        S: Stream<Item = Result<Bytes, E>> + Send,
        E: std::fmt::Display,
    {
        let declared = descriptor.declared_len;
        let (tx, mut rx) = mpsc::channel::<Result<Bytes, StorageError>>(WRITE_CHANNEL_DEPTH);

        let writer_storage = self.storage.clone();
        let writer_target = target.clone();
        let content_type = descriptor.content_type.clone();
        let writer = tokio::spawn(async move {
            let stream: ByteStream =
                Box::pin(futures::stream::poll_fn(move |cx| rx.poll_recv(cx)));
            writer_storage
                .put_stream(&writer_target, &content_type, stream)
                .await
        });

        let mut received: u64 = 0;
        let mut failure: Option<AppError> = None;
        let mut writer_gone = false;

        futures::pin_mut!(body);
        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(bytes) => {
                    received += bytes.len() as u64;
                    if received > declared {
                        let _ = tx
                            .send(Err(StorageError::WriteAborted(format!(
                                "declared {} bytes, received at least {}",
                                declared, received
                            ))))
                            .await;
                        failure = Some(AppError::SizeMismatch {
                            declared,
                            actual: received,
                        });
                        break;
                    }
                    if tx.send(Ok(bytes)).await.is_err() {
                        writer_gone = true;
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx
                        .send(Err(StorageError::WriteAborted(format!(
                            "inbound stream failed: {}",
                            e
                        ))))
                        .await;
                    failure = Some(AppError::InvalidRequest(format!(
                        "Upload stream interrupted: {}",
                        e
                    )));
                    break;
                }
            }
        }

        if failure.is_none() && !writer_gone && received != declared {
            let _ = tx
                .send(Err(StorageError::WriteAborted(format!(
                    "declared {} bytes but stream ended after {}",
                    declared, received
                ))))
                .await;
            failure = Some(AppError::SizeMismatch {
                declared,
                actual: received,
            });
        }

        // Closing the channel lets a clean writer finalize.
        drop(tx);
        let write_result = writer.await;

        match (failure, write_result) {
            (Some(reason), _) => UploadOutcome::Rejected { reason },
            (None, Ok(Ok(bytes_written))) if bytes_written == declared => {
                UploadOutcome::Committed {
                    object: target.clone(),
                    bytes_written,
                }
            }
            (None, Ok(Ok(bytes_written))) => UploadOutcome::Rejected {
                reason: AppError::SizeMismatch {
                    declared,
                    actual: bytes_written,
                },
            },
            (None, Ok(Err(e))) => UploadOutcome::Rejected {
                reason: AppError::BackendFailure(e.to_string()),
            },
            (None, Err(e)) => UploadOutcome::Rejected {
                reason: AppError::BackendFailure(format!("upload writer task failed: {}", e)),
            },
        }
    }

    async fn handle_avatar<S, E>(
        &self,
        descriptor: UploadDescriptor,
        body: S,
    ) -> Result<UploadReceipt, AppError>
    where
        S: Stream<Item = Result<Bytes, E>> + Send,
        E: std::fmt::Display,
    {
        let declared = descriptor.declared_len;
        let mut buffer = BytesMut::with_capacity(declared as usize);

        futures::pin_mut!(body);
        while let Some(chunk) = body.next().await {
            let bytes = chunk.map_err(|e| {
                AppError::InvalidRequest(format!("Upload stream interrupted: {}", e))
            })?;
            if buffer.len() as u64 + bytes.len() as u64 > declared {
                return Err(AppError::SizeMismatch {
                    declared,
                    actual: buffer.len() as u64 + bytes.len() as u64,
                });
            }
            buffer.extend_from_slice(&bytes);
        }

        if buffer.len() as u64 != declared {
            return Err(AppError::SizeMismatch {
                declared,
                actual: buffer.len() as u64,
            });
        }

        let result = self
            .avatars
            .upload(
                &descriptor.caller,
                buffer.freeze(),
                AvatarUploadOptions {
                    file_name: descriptor.file_name.clone(),
                    content_type: descriptor.content_type.clone(),
                },
            )
            .await;

        if !result.success {
            let detail = result
                .error
                .unwrap_or_else(|| "avatar upload failed".to_string());
            return Err(AppError::BackendFailure(detail));
        }

        let public_url = result
            .urls
            .map(|u| u.original)
            .ok_or_else(|| {
                AppError::BackendFailure("avatar upload returned no URL".to_string())
            })?;

        tracing::info!(
            caller = %descriptor.caller,
            size_bytes = declared,
            degraded = result.degraded,
            "avatar upload committed"
        );

        Ok(UploadReceipt {
            public_url,
            size: declared,
            content_type: descriptor.content_type,
            degraded: Some(result.degraded),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::avatar::{AvatarUploadResult, AvatarUrls, StorageAvatarMedia};
    use async_trait::async_trait;
    use axum::http::HeaderValue;
    use futures::stream;
    use mediagate_storage::MemoryStorage;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const MIB: u64 = 1024 * 1024;

    fn policy() -> UploadPolicy {
        let config = test_config();
        UploadPolicy::from_config(&config)
    }

    fn test_config() -> mediagate_core::Config {
        mediagate_core::Config {
            server_port: 4000,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
            log_json: false,
            service_token: "0123456789abcdef0123456789abcdef".to_string(),
            storage_backend: mediagate_core::StorageBackend::Memory,
            s3_region: None,
            s3_endpoint: None,
            public_search_paths: vec!["/assets/public".to_string()],
            private_object_root: "/assets/.private".to_string(),
            storage_public_base_url: None,
            upload_grant_ttl_secs: 900,
            max_upload_bytes: 10 * MIB,
            max_avatar_bytes: MIB,
            product_content_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
            profile_content_types: vec!["image/png".to_string()],
            post_content_types: vec!["image/png".to_string(), "video/mp4".to_string()],
            startup_diagnostics: false,
        }
    }

    fn gateway() -> (Arc<MemoryStorage>, UploadGateway) {
        let storage = Arc::new(MemoryStorage::new(vec!["assets".to_string()]));
        let resolver = Arc::new(
            PathResolver::new(
                vec!["/assets/public".to_string()],
                "/assets/.private".to_string(),
                None,
            )
            .unwrap(),
        );
        let avatars = Arc::new(StorageAvatarMedia::new(storage.clone(), resolver.clone()));
        let gateway = UploadGateway::new(storage.clone(), resolver, avatars);
        (storage, gateway)
    }

    fn upload_headers(category: &str, content_type: &str, length: u64) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_UPLOAD_CATEGORY, HeaderValue::from_str(category).unwrap());
        headers.insert(HEADER_FILE_TYPE, HeaderValue::from_str(content_type).unwrap());
        headers.insert(HEADER_FILE_NAME, HeaderValue::from_static("photo.png"));
        headers.insert(
            header::CONTENT_LENGTH,
            HeaderValue::from_str(&length.to_string()).unwrap(),
        );
        headers
    }

    fn descriptor(category: UploadCategory, declared_len: u64) -> UploadDescriptor {
        UploadDescriptor {
            file_name: "photo.png".to_string(),
            declared_len,
            content_type: "image/png".to_string(),
            category,
            caller: "service".to_string(),
        }
    }

    fn body_of(chunks: Vec<&'static [u8]>) -> impl Stream<Item = Result<Bytes, Infallible>> {
        stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from_static(c))))
    }

    #[test]
    fn descriptor_accepts_valid_metadata() {
        let headers = upload_headers("product", "image/png", 1024);
        let d = UploadDescriptor::from_headers(&headers, "user-1", &policy()).unwrap();
        assert_eq!(d.category, UploadCategory::Product);
        assert_eq!(d.declared_len, 1024);
        assert_eq!(d.content_type, "image/png");
        assert_eq!(d.file_name, "photo.png");
        assert_eq!(d.caller, "user-1");
    }

    #[test]
    fn descriptor_requires_content_length() {
        let mut headers = upload_headers("product", "image/png", 1024);
        headers.remove(header::CONTENT_LENGTH);
        let err = UploadDescriptor::from_headers(&headers, "u", &policy()).unwrap_err();
        assert!(matches!(err, AppError::LengthRequired(_)));
    }

    #[test]
    fn descriptor_rejects_zero_length() {
        let headers = upload_headers("product", "image/png", 0);
        let err = UploadDescriptor::from_headers(&headers, "u", &policy()).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn descriptor_rejects_over_cap() {
        let headers = upload_headers("product", "image/png", 11 * MIB);
        let err = UploadDescriptor::from_headers(&headers, "u", &policy()).unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge { .. }));
    }

    #[test]
    fn profile_cap_is_one_mib() {
        let headers = upload_headers("profile", "image/png", 2 * MIB);
        let err = UploadDescriptor::from_headers(&headers, "u", &policy()).unwrap_err();
        assert!(matches!(
            err,
            AppError::PayloadTooLarge { limit, .. } if limit == MIB
        ));
    }

    #[test]
    fn descriptor_rejects_off_list_mime_without_touching_body() {
        let headers = upload_headers("product", "application/zip", 1024);

        let polled = Arc::new(AtomicUsize::new(0));
        let counter = polled.clone();
        let _body = stream::iter(vec![Ok::<_, Infallible>(Bytes::from_static(b"data"))])
            .inspect(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        let err = UploadDescriptor::from_headers(&headers, "u", &policy()).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
        // Validation happens on headers alone; the body stream is never polled.
        assert_eq!(polled.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn exact_length_commits() {
        let (storage, gateway) = gateway();
        let d = descriptor(UploadCategory::Product, 11);
        let target = ObjectRef::new("assets", "public/product/exact.png");

        let outcome = gateway
            .stream_upload(&d, &target, body_of(vec![b"hello ", b"world"]))
            .await;

        match outcome {
            UploadOutcome::Committed {
                object,
                bytes_written,
            } => {
                assert_eq!(bytes_written, 11);
                assert_eq!(object, target);
            }
            other => panic!("expected commit, got {:?}", other),
        }

        let stat = storage.stat(&target).await.unwrap();
        assert_eq!(stat.size, 11);
        assert_eq!(stat.content_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn overrun_aborts_and_stops_reading() {
        let (storage, gateway) = gateway();
        let d = descriptor(UploadCategory::Product, 4);
        let target = ObjectRef::new("assets", "public/product/overrun.png");

        let yielded = Arc::new(AtomicUsize::new(0));
        let counter = yielded.clone();
        let chunks: Vec<Result<Bytes, Infallible>> = vec![
            Ok(Bytes::from_static(b"1234")),
            Ok(Bytes::from_static(b"56")),
            Ok(Bytes::from_static(b"789")),
        ];
        let body = stream::iter(chunks).inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let outcome = gateway.stream_upload(&d, &target, body).await;
        match outcome {
            UploadOutcome::Rejected { reason } => {
                assert!(matches!(
                    reason,
                    AppError::SizeMismatch {
                        declared: 4,
                        actual: 6
                    }
                ));
            }
            other => panic!("expected rejection, got {:?}", other),
        }

        // Reading stopped at the violating chunk; the third was never pulled.
        assert_eq!(yielded.load(Ordering::SeqCst), 2);
        assert!(!storage.exists(&target).await.unwrap());
    }

    #[tokio::test]
    async fn short_stream_rejects_and_discards() {
        let (storage, gateway) = gateway();
        let d = descriptor(UploadCategory::Product, 5000);
        let target = ObjectRef::new("assets", "public/product/short.png");

        let chunk = Bytes::from(vec![0u8; 4000]);
        let body = stream::iter(vec![Ok::<_, Infallible>(chunk)]);

        let outcome = gateway.stream_upload(&d, &target, body).await;
        match outcome {
            UploadOutcome::Rejected { reason } => {
                assert!(matches!(
                    reason,
                    AppError::SizeMismatch {
                        declared: 5000,
                        actual: 4000
                    }
                ));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert!(!storage.exists(&target).await.unwrap());
    }

    #[tokio::test]
    async fn inbound_error_aborts_cleanly() {
        let (storage, gateway) = gateway();
        let d = descriptor(UploadCategory::Product, 100);
        let target = ObjectRef::new("assets", "public/product/broken.png");

        let chunks: Vec<Result<Bytes, String>> = vec![
            Ok(Bytes::from_static(b"start")),
            Err("connection reset".to_string()),
        ];
        let body = stream::iter(chunks);

        let outcome = gateway.stream_upload(&d, &target, body).await;
        match outcome {
            UploadOutcome::Rejected { reason } => {
                assert!(matches!(reason, AppError::InvalidRequest(_)));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert!(!storage.exists(&target).await.unwrap());
    }

    #[tokio::test]
    async fn streamed_upload_lands_under_category_prefix() {
        let (storage, gateway) = gateway();
        let d = descriptor(UploadCategory::Post, 4);

        let receipt = gateway
            .handle_upload(d, body_of(vec![b"abcd"]))
            .await
            .unwrap();

        assert!(receipt.public_url.starts_with("/media/post/"));
        assert_eq!(receipt.size, 4);
        assert_eq!(receipt.content_type, "image/png");
        assert!(receipt.degraded.is_none());

        let stored = storage.list_objects("assets", "public/post", 10).await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn profile_upload_uses_default_collaborator() {
        let (_storage, gateway) = gateway();
        let d = descriptor(UploadCategory::Profile, 7);

        let receipt = gateway
            .handle_upload(d, body_of(vec![b"avatar!"]))
            .await
            .unwrap();

        assert_eq!(receipt.degraded, Some(true));
        assert!(receipt.public_url.starts_with("/media/profile/"));
        assert_eq!(receipt.size, 7);
    }

    #[tokio::test]
    async fn profile_short_body_rejects_before_collaborator() {
        struct PanickingAvatars;

        #[async_trait]
        impl AvatarMedia for PanickingAvatars {
            async fn upload(
                &self,
                _user_id: &str,
                _bytes: Bytes,
                _options: AvatarUploadOptions,
            ) -> AvatarUploadResult {
                panic!("collaborator must not run for a short body");
            }
        }

        let storage = Arc::new(MemoryStorage::new(vec!["assets".to_string()]));
        let resolver = Arc::new(
            PathResolver::new(
                vec!["/assets/public".to_string()],
                "/assets/.private".to_string(),
                None,
            )
            .unwrap(),
        );
        let gateway = UploadGateway::new(storage, resolver, Arc::new(PanickingAvatars));

        let d = descriptor(UploadCategory::Profile, 10);
        let err = gateway
            .handle_upload(d, body_of(vec![b"short"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SizeMismatch { .. }));
    }

    #[tokio::test]
    async fn profile_upload_carries_collaborator_degraded_flag() {
        struct FullPipelineAvatars;

        #[async_trait]
        impl AvatarMedia for FullPipelineAvatars {
            async fn upload(
                &self,
                user_id: &str,
                _bytes: Bytes,
                _options: AvatarUploadOptions,
            ) -> AvatarUploadResult {
                AvatarUploadResult {
                    success: true,
                    urls: Some(AvatarUrls {
                        original: format!("/media/profile/aa/{}.png", user_id),
                        variants: Some(vec![format!(
                            "/media/profile/aa/{}_thumb.png",
                            user_id
                        )]),
                    }),
                    degraded: false,
                    error: None,
                }
            }
        }

        let storage = Arc::new(MemoryStorage::new(vec!["assets".to_string()]));
        let resolver = Arc::new(
            PathResolver::new(
                vec!["/assets/public".to_string()],
                "/assets/.private".to_string(),
                None,
            )
            .unwrap(),
        );
        let gateway = UploadGateway::new(storage, resolver, Arc::new(FullPipelineAvatars));

        let mut d = descriptor(UploadCategory::Profile, 7);
        d.caller = "user-42".to_string();
        let receipt = gateway
            .handle_upload(d, body_of(vec![b"avatar!"]))
            .await
            .unwrap();

        assert_eq!(receipt.degraded, Some(false));
        assert_eq!(receipt.public_url, "/media/profile/aa/user-42.png");
    }

    #[tokio::test]
    async fn failed_collaborator_surfaces_backend_failure() {
        struct BrokenAvatars;

        #[async_trait]
        impl AvatarMedia for BrokenAvatars {
            async fn upload(
                &self,
                _user_id: &str,
                _bytes: Bytes,
                _options: AvatarUploadOptions,
            ) -> AvatarUploadResult {
                AvatarUploadResult::failure("pipeline offline")
            }
        }

        let storage = Arc::new(MemoryStorage::new(vec!["assets".to_string()]));
        let resolver = Arc::new(
            PathResolver::new(
                vec!["/assets/public".to_string()],
                "/assets/.private".to_string(),
                None,
            )
            .unwrap(),
        );
        let gateway = UploadGateway::new(storage, resolver, Arc::new(BrokenAvatars));

        let d = descriptor(UploadCategory::Profile, 4);
        let err = gateway
            .handle_upload(d, body_of(vec![b"data"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BackendFailure(_)));
    }
}
