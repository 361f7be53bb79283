use std::collections::BTreeSet;
use std::sync::Arc;

use mediagate_core::{Config, StorageBackend};

use crate::memory::MemoryStorage;
use crate::resolver::parse_object_path;
use crate::s3::S3Storage;
use crate::traits::{Storage, StorageError, StorageResult};

/// Every bucket named by the configured path roots, deduplicated and sorted.
pub fn configured_buckets(config: &Config) -> StorageResult<Vec<String>> {
    let mut buckets = BTreeSet::new();
    let roots = config
        .public_search_paths
        .iter()
        .chain(std::iter::once(&config.private_object_root));
    for root in roots {
        buckets.insert(parse_object_path(root)?.bucket);
    }
    Ok(buckets.into_iter().collect())
}

/// Build the storage backend selected by configuration.
pub fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let buckets = configured_buckets(config)?;

    match config.storage_backend {
        StorageBackend::S3 => {
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError(
                    "S3_REGION is required for the s3 backend".to_string(),
                )
            })?;
            tracing::info!(
                backend = %StorageBackend::S3,
                region = %region,
                endpoint = config.s3_endpoint.as_deref().unwrap_or("aws"),
                buckets = buckets.len(),
                "initializing storage backend"
            );
            let storage = S3Storage::new(buckets, region, config.s3_endpoint.clone())?;
            Ok(Arc::new(storage))
        }
        StorageBackend::Memory => {
            tracing::info!(
                backend = %StorageBackend::Memory,
                buckets = buckets.len(),
                "initializing storage backend"
            );
            Ok(Arc::new(MemoryStorage::new(buckets)))
        }
    }
}
