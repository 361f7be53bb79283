//! Mediagate Storage Library
//!
//! Storage abstraction and implementations for the upload gateway: the
//! [`Storage`] trait with S3 and in-memory backends, logical path resolution,
//! signed-grant issuance, object key generation, and the storage health
//! diagnostics probe.
//!
//! # Key format
//!
//! Objects live at `{root}/{category}/{generated-filename}` where `root` is a
//! configured `/bucket/prefix` entry. Keys never contain `..` segments or a
//! leading `/`; generation is centralized in the `keys` module so every
//! writer stays consistent.

pub mod diagnostics;
pub mod factory;
pub mod keys;
pub mod memory;
pub mod resolver;
pub mod s3;
pub mod signer;
pub mod traits;

// Re-export commonly used types
pub use diagnostics::{run_diagnostics, DiagnosticsReport};
pub use factory::create_storage;
pub use mediagate_core::StorageBackend;
pub use memory::MemoryStorage;
pub use resolver::{parse_object_path, PathResolver};
pub use s3::S3Storage;
pub use signer::{GrantIssuer, SignedGrant};
pub use traits::{ByteStream, GrantMethod, ObjectStat, Storage, StorageError, StorageResult};
