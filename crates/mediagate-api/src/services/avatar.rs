//! Avatar media collaborator.
//!
//! Profile uploads hand their completed bytes to an [`AvatarMedia`]
//! implementation that owns thumbnail generation and storage placement. The
//! gateway treats it as a black box; a failed variant pipeline is reported as
//! `degraded` rather than failing the upload.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use mediagate_storage::{keys, PathResolver, Storage};
use sha2::{Digest, Sha256};

use mediagate_core::UploadCategory;

#[derive(Debug, Clone)]
pub struct AvatarUploadOptions {
    pub file_name: String,
    pub content_type: String,
}

#[derive(Debug, Clone)]
pub struct AvatarUrls {
    pub original: String,
    pub variants: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct AvatarUploadResult {
    pub success: bool,
    pub urls: Option<AvatarUrls>,
    pub degraded: bool,
    pub error: Option<String>,
}

impl AvatarUploadResult {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            urls: None,
            degraded: false,
            error: Some(error.into()),
        }
    }
}

#[async_trait]
pub trait AvatarMedia: Send + Sync {
    async fn upload(
        &self,
        user_id: &str,
        bytes: Bytes,
        options: AvatarUploadOptions,
    ) -> AvatarUploadResult;
}

/// Storage-backed collaborator used when no external thumbnail pipeline is
/// wired. Stores the original under a sharded key and always reports
/// `degraded: true` since no variants are produced.
pub struct StorageAvatarMedia {
    storage: Arc<dyn Storage>,
    resolver: Arc<PathResolver>,
}

impl StorageAvatarMedia {
    pub fn new(storage: Arc<dyn Storage>, resolver: Arc<PathResolver>) -> Self {
        Self { storage, resolver }
    }

    /// Two-hex-character shard from the user id, so avatars spread across 256
    /// prefixes instead of piling into one.
    fn shard_for(user_id: &str) -> String {
        let digest = Sha256::digest(user_id.as_bytes());
        format!("{:02x}", digest[0])
    }
}

#[async_trait]
impl AvatarMedia for StorageAvatarMedia {
    async fn upload(
        &self,
        user_id: &str,
        bytes: Bytes,
        options: AvatarUploadOptions,
    ) -> AvatarUploadResult {
        let shard = Self::shard_for(user_id);
        let object_name = keys::generate_object_name(UploadCategory::Profile, &options.file_name);
        let relative = format!("profile/{}/{}", shard, object_name);

        let object = match self.resolver.public_upload_target(&relative) {
            Ok(object) => object,
            Err(e) => {
                tracing::error!(error = %e, user_id = %user_id, "avatar target resolution failed");
                return AvatarUploadResult::failure(e.to_string());
            }
        };

        if let Err(e) = self
            .storage
            .save(&object, &options.content_type, bytes)
            .await
        {
            tracing::error!(
                error = %e,
                bucket = %object.bucket,
                key = %object.key,
                user_id = %user_id,
                "avatar write failed"
            );
            return AvatarUploadResult::failure(e.to_string());
        }

        tracing::info!(
            bucket = %object.bucket,
            key = %object.key,
            user_id = %user_id,
            shard = %shard,
            "avatar stored without variants"
        );

        AvatarUploadResult {
            success: true,
            urls: Some(AvatarUrls {
                original: format!("/media/{}", relative),
                variants: None,
            }),
            degraded: true,
            error: None,
        }
    }
}
