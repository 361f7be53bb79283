use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use mediagate_core::ObjectRef;
use serde::Serialize;

use crate::traits::{GrantMethod, Storage, StorageError, StorageResult};

/// Default lifetime of a direct-transfer grant.
pub const DEFAULT_GRANT_TTL_SECS: u64 = 900;

/// A time-bounded, method-scoped authorization to act on one object directly
/// against the backend. Expiry is enforced by the backend itself; this type
/// records the window so callers can report it.
///
/// The URL never carries a per-object ACL parameter. Visibility is whatever
/// the bucket is configured to allow, nothing wider.
#[derive(Debug, Clone, Serialize)]
pub struct SignedGrant {
    pub object: ObjectRef,
    pub method: GrantMethod,
    pub url: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SignedGrant {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Seconds of validity remaining at issue time.
    pub fn ttl_secs(&self) -> u64 {
        (self.expires_at - self.issued_at).num_seconds().max(0) as u64
    }
}

/// Issues signed grants with a fixed default TTL.
pub struct GrantIssuer {
    storage: Arc<dyn Storage>,
    ttl: Duration,
}

impl GrantIssuer {
    pub fn new(storage: Arc<dyn Storage>, ttl_secs: u64) -> Self {
        GrantIssuer {
            storage,
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a grant with the configured default TTL.
    pub async fn issue(&self, object: &ObjectRef, method: GrantMethod) -> StorageResult<SignedGrant> {
        self.issue_with_ttl(object, method, self.ttl).await
    }

    /// Issue a grant valid for `ttl` from now.
    pub async fn issue_with_ttl(
        &self,
        object: &ObjectRef,
        method: GrantMethod,
        ttl: Duration,
    ) -> StorageResult<SignedGrant> {
        let url = self.storage.signed_url(object, method, ttl).await?;
        let issued_at = Utc::now();
        let validity = chrono::Duration::from_std(ttl)
            .map_err(|e| StorageError::ConfigError(format!("grant ttl out of range: {}", e)))?;

        let grant = SignedGrant {
            object: object.clone(),
            method,
            url,
            issued_at,
            expires_at: issued_at + validity,
        };

        tracing::debug!(
            bucket = %grant.object.bucket,
            key = %grant.object.key,
            method = grant.method.as_str(),
            expires_at = %grant.expires_at,
            "issued signed grant"
        );

        Ok(grant)
    }
}
