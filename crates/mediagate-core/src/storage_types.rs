use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// This enum defines the available storage backend types. It's defined in core
/// because it's used by both configuration and the storage crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Identifies exactly one stored object as a (bucket, key) pair.
///
/// Immutable once constructed. References are derived from logical paths by
/// the path resolver, or generated for new uploads by the key builder; they
/// are never assembled ad hoc at call sites.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

impl ObjectRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Bucket-qualified path form, `/bucket/key`.
    pub fn object_path(&self) -> String {
        format!("/{}/{}", self.bucket, self.key)
    }

    /// A reference below this one, joined with a single separator.
    pub fn child(&self, suffix: impl AsRef<str>) -> Self {
        Self {
            bucket: self.bucket.clone(),
            key: format!(
                "{}/{}",
                self.key.trim_end_matches('/'),
                suffix.as_ref().trim_start_matches('/')
            ),
        }
    }
}

impl Display for ObjectRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "/{}/{}", self.bucket, self.key)
    }
}
