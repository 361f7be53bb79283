use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use http::Method;
use mediagate_core::{ObjectRef, StorageBackend};
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::buffered::BufWriter;
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, AttributeValue, Attributes, GetOptions, GetRange, ObjectStore, ObjectStoreExt,
    PutOptions, PutPayload, Result as ObjectResult,
};
use tokio::io::AsyncWriteExt;

use crate::traits::{ByteStream, GrantMethod, ObjectStat, Storage, StorageError, StorageResult};

/// Buffer threshold for streamed writes. At this size the buffered writer
/// starts flushing multipart parts (the S3 minimum part size), so an upload
/// never holds more than one part in memory.
const STREAM_BUFFER_CAPACITY: usize = 5 * 1024 * 1024;

/// S3 storage implementation
///
/// Holds one `object_store` client per configured bucket; the set of buckets
/// is fixed at startup (derived from the configured path roots) and the map
/// is read-only afterwards. Addressing a bucket outside the configured set is
/// a configuration error, not a lazy client build.
pub struct S3Storage {
    clients: HashMap<String, Arc<AmazonS3>>,
    region: String,
    endpoint_url: Option<String>,
}

impl S3Storage {
    /// Create a new S3Storage instance covering `buckets`.
    ///
    /// # Arguments
    /// * `buckets` - every bucket named by the configured path roots
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(
        buckets: impl IntoIterator<Item = String>,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut clients = HashMap::new();
        for bucket in buckets {
            // Build AmazonS3 object store from environment and explicit settings.
            let mut builder = AmazonS3Builder::from_env()
                .with_region(region.clone())
                .with_bucket_name(bucket.clone());

            if let Some(ref endpoint) = endpoint_url {
                let allow_http = endpoint.starts_with("http://");
                builder = builder
                    .with_endpoint(endpoint.clone())
                    .with_allow_http(allow_http);
            }

            let store = builder
                .build()
                .map_err(|e| StorageError::ConfigError(e.to_string()))?;
            clients.insert(bucket, Arc::new(store));
        }

        Ok(S3Storage {
            clients,
            region,
            endpoint_url,
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    fn client(&self, bucket: &str) -> StorageResult<&Arc<AmazonS3>> {
        self.clients.get(bucket).ok_or_else(|| {
            StorageError::ConfigError(format!("bucket not configured: {}", bucket))
        })
    }
}

fn content_type_attributes(content_type: &str) -> Attributes {
    Attributes::from_iter([(
        Attribute::ContentType,
        AttributeValue::from(content_type.to_string()),
    )])
}

fn method_for(method: GrantMethod) -> Method {
    match method {
        GrantMethod::Get => Method::GET,
        GrantMethod::Put => Method::PUT,
        GrantMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn exists(&self, object: &ObjectRef) -> StorageResult<bool> {
        let store = self.client(&object.bucket)?;
        let location = Path::from(object.key.as_str());
        match store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn stat(&self, object: &ObjectRef) -> StorageResult<ObjectStat> {
        let store = self.client(&object.bucket)?;
        let location = Path::from(object.key.as_str());
        let options = GetOptions {
            head: true,
            ..Default::default()
        };

        let result = store.get_opts(&location, options).await.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(object.to_string()),
            other => StorageError::BackendError(other.to_string()),
        })?;

        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|v| v.to_string());

        Ok(ObjectStat {
            size: result.meta.size,
            content_type,
            etag: result.meta.e_tag.clone(),
            last_modified: result.meta.last_modified,
        })
    }

    async fn read_stream(
        &self,
        object: &ObjectRef,
        range: Option<Range<u64>>,
    ) -> StorageResult<ByteStream> {
        let store = self.client(&object.bucket)?;
        let location = Path::from(object.key.as_str());
        let options = GetOptions {
            range: range.map(GetRange::Bounded),
            ..Default::default()
        };

        let result = store.get_opts(&location, options).await.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(object.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %object.bucket,
                    key = %object.key,
                    "S3 read failed"
                );
                StorageError::ReadFailed(other.to_string())
            }
        })?;

        let bucket = object.bucket.clone();
        let key = object.key.clone();
        let stream = result.into_stream().map(move |res| {
            res.map_err(|e| {
                tracing::error!(bucket = %bucket, key = %key, error = %e, "S3 stream read error");
                StorageError::ReadFailed(e.to_string())
            })
        });

        Ok(Box::pin(stream))
    }

    async fn put_stream(
        &self,
        object: &ObjectRef,
        content_type: &str,
        mut body: ByteStream,
    ) -> StorageResult<u64> {
        let store = self.client(&object.bucket)?.clone();
        let location = Path::from(object.key.as_str());
        let start = std::time::Instant::now();

        let dyn_store: Arc<dyn ObjectStore> = store;
        let mut writer =
            BufWriter::with_capacity(dyn_store, location, STREAM_BUFFER_CAPACITY)
                .with_attributes(content_type_attributes(content_type));
        let mut written: u64 = 0;

        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(bytes) => {
                    written += bytes.len() as u64;
                    if let Err(e) = writer.write_all(&bytes).await {
                        let _ = writer.abort().await;
                        tracing::error!(
                            error = %e,
                            bucket = %object.bucket,
                            key = %object.key,
                            bytes_so_far = written,
                            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                            "S3 streamed write failed"
                        );
                        return Err(StorageError::WriteFailed(e.to_string()));
                    }
                }
                Err(e) => {
                    // The producer signalled abort; discard all written parts.
                    if let Err(abort_err) = writer.abort().await {
                        tracing::warn!(
                            error = %abort_err,
                            bucket = %object.bucket,
                            key = %object.key,
                            "S3 multipart abort failed after upstream error"
                        );
                    }
                    tracing::info!(
                        bucket = %object.bucket,
                        key = %object.key,
                        bytes_discarded = written,
                        reason = %e,
                        "S3 streamed write aborted"
                    );
                    return Err(e);
                }
            }
        }

        writer.shutdown().await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %object.bucket,
                key = %object.key,
                size_bytes = written,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 streamed write finalize failed"
            );
            StorageError::WriteFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %object.bucket,
            key = %object.key,
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 streamed write committed"
        );

        Ok(written)
    }

    async fn save(&self, object: &ObjectRef, content_type: &str, data: Bytes) -> StorageResult<()> {
        let store = self.client(&object.bucket)?;
        let location = Path::from(object.key.as_str());
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        let options = PutOptions {
            attributes: content_type_attributes(content_type),
            ..Default::default()
        };

        let result: ObjectResult<_> = store
            .put_opts(&location, PutPayload::from(data), options)
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %object.bucket,
                key = %object.key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 write failed"
            );
            StorageError::WriteFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %object.bucket,
            key = %object.key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 write successful"
        );

        Ok(())
    }

    async fn delete(&self, object: &ObjectRef) -> StorageResult<bool> {
        let store = self.client(&object.bucket)?;
        let location = Path::from(object.key.as_str());
        let start = std::time::Instant::now();

        match store.delete(&location).await {
            Ok(()) => {
                tracing::info!(
                    bucket = %object.bucket,
                    key = %object.key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete successful"
                );
                // S3 reports success for absent keys as well.
                Ok(true)
            }
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %object.bucket,
                    key = %object.key,
                    "S3 delete failed"
                );
                Err(StorageError::DeleteFailed(e.to_string()))
            }
        }
    }

    async fn signed_url(
        &self,
        object: &ObjectRef,
        method: GrantMethod,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let store = self.client(&object.bucket)?;
        let location = Path::from(object.key.as_str());

        let url = store
            .signed_url(method_for(method), &location, expires_in)
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        Ok(url.to_string())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        limit: usize,
    ) -> StorageResult<Vec<ObjectRef>> {
        let store = self.client(bucket)?;
        let prefix_path = if prefix.is_empty() {
            None
        } else {
            Some(Path::from(prefix))
        };

        let mut stream = store.list(prefix_path.as_ref());
        let mut objects = Vec::new();
        while let Some(meta) = stream.next().await {
            let meta = meta.map_err(|e| StorageError::BackendError(e.to_string()))?;
            objects.push(ObjectRef::new(bucket, meta.location.to_string()));
            if objects.len() >= limit {
                break;
            }
        }
        Ok(objects)
    }

    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        let Ok(store) = self.client(bucket) else {
            return Ok(false);
        };

        // A single-entry list proves the bucket is reachable; an empty bucket
        // yields no entries but also no error.
        let mut stream = store.list(None);
        match stream.next().await {
            None | Some(Ok(_)) => Ok(true),
            Some(Err(ObjectStoreError::NotFound { .. })) => Ok(false),
            Some(Err(e)) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
