use std::collections::HashMap;
use std::ops::Range;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use mediagate_core::{ObjectRef, StorageBackend};
use object_store::buffered::BufWriter;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, AttributeValue, Attributes, GetOptions, GetRange, ObjectStore, ObjectStoreExt,
    PutOptions, PutPayload,
};
use tokio::io::AsyncWriteExt;

use crate::traits::{ByteStream, GrantMethod, ObjectStat, Storage, StorageError, StorageResult};

/// In-memory storage implementation backed by `object_store::memory::InMemory`.
///
/// Used for tests and local development; buckets are plain map entries and are
/// provisioned on first write. URLs produced by `signed_url` carry no real
/// signature and are only meaningful inside a test process.
pub struct MemoryStorage {
    buckets: RwLock<HashMap<String, Arc<InMemory>>>,
}

impl MemoryStorage {
    pub fn new(buckets: impl IntoIterator<Item = String>) -> Self {
        let map = buckets
            .into_iter()
            .map(|b| (b, Arc::new(InMemory::new())))
            .collect();
        MemoryStorage {
            buckets: RwLock::new(map),
        }
    }

    /// An empty store with no pre-provisioned buckets.
    pub fn empty() -> Self {
        MemoryStorage {
            buckets: RwLock::new(HashMap::new()),
        }
    }

    fn bucket(&self, name: &str) -> Option<Arc<InMemory>> {
        self.buckets
            .read()
            .ok()
            .and_then(|map| map.get(name).cloned())
    }

    fn bucket_or_provision(&self, name: &str) -> StorageResult<Arc<InMemory>> {
        let mut map = self
            .buckets
            .write()
            .map_err(|_| StorageError::BackendError("bucket map lock poisoned".to_string()))?;
        Ok(map
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(InMemory::new()))
            .clone())
    }

    fn bucket_or_not_found(&self, object: &ObjectRef) -> StorageResult<Arc<InMemory>> {
        self.bucket(&object.bucket)
            .ok_or_else(|| StorageError::NotFound(object.to_string()))
    }
}

fn content_type_attributes(content_type: &str) -> Attributes {
    Attributes::from_iter([(
        Attribute::ContentType,
        AttributeValue::from(content_type.to_string()),
    )])
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn exists(&self, object: &ObjectRef) -> StorageResult<bool> {
        let Some(store) = self.bucket(&object.bucket) else {
            return Ok(false);
        };
        match store.head(&Path::from(object.key.as_str())).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn stat(&self, object: &ObjectRef) -> StorageResult<ObjectStat> {
        let store = self.bucket_or_not_found(object)?;
        let options = GetOptions {
            head: true,
            ..Default::default()
        };

        let result = store
            .get_opts(&Path::from(object.key.as_str()), options)
            .await
            .map_err(|e| match e {
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
        let store = self.bucket_or_not_found(object)?;
        let options = GetOptions {
            range: range.map(GetRange::Bounded),
            ..Default::default()
        };

        let result = store
            .get_opts(&Path::from(object.key.as_str()), options)
            .await
            .map_err(|e| match e {
                ObjectStoreError::NotFound { .. } => StorageError::NotFound(object.to_string()),
                other => StorageError::ReadFailed(other.to_string()),
            })?;

        let stream = result
            .into_stream()
            .map(|res| res.map_err(|e| StorageError::ReadFailed(e.to_string())));
        Ok(Box::pin(stream))
    }

    async fn put_stream(
        &self,
        object: &ObjectRef,
        content_type: &str,
        mut body: ByteStream,
    ) -> StorageResult<u64> {
        let store = self.bucket_or_provision(&object.bucket)?;
        let dyn_store: Arc<dyn ObjectStore> = store;
        let mut writer = BufWriter::new(dyn_store, Path::from(object.key.as_str()))
            .with_attributes(content_type_attributes(content_type));
        let mut written: u64 = 0;

        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(bytes) => {
                    written += bytes.len() as u64;
                    writer
                        .write_all(&bytes)
                        .await
                        .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
                }
                Err(e) => {
                    let _ = writer.abort().await;
                    return Err(e);
                }
            }
        }

        writer
            .shutdown()
            .await
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        Ok(written)
    }

    async fn save(&self, object: &ObjectRef, content_type: &str, data: Bytes) -> StorageResult<()> {
        let store = self.bucket_or_provision(&object.bucket)?;
        let options = PutOptions {
            attributes: content_type_attributes(content_type),
            ..Default::default()
        };

        store
            .put_opts(
                &Path::from(object.key.as_str()),
                PutPayload::from(data),
                options,
            )
            .await
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, object: &ObjectRef) -> StorageResult<bool> {
        let Some(store) = self.bucket(&object.bucket) else {
            return Ok(false);
        };
        match store.delete(&Path::from(object.key.as_str())).await {
            Ok(()) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::DeleteFailed(e.to_string())),
        }
    }

    async fn signed_url(
        &self,
        object: &ObjectRef,
        method: GrantMethod,
        expires_in: Duration,
    ) -> StorageResult<String> {
        // No real signing for the in-memory backend; the URL is a recognizable
        // placeholder so tests can assert on its shape.
        Ok(format!(
            "memory://{}/{}?method={}&expires_in={}",
            object.bucket,
            object.key,
            method.as_str(),
            expires_in.as_secs()
        ))
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        limit: usize,
    ) -> StorageResult<Vec<ObjectRef>> {
        let Some(store) = self.bucket(bucket) else {
            return Ok(Vec::new());
        };
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
        Ok(self.bucket(bucket).is_some())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
