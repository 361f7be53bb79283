//! Mediagate Core Library
//!
//! This crate provides the domain types shared across all mediagate components:
//! the error taxonomy, environment configuration, upload categories and their
//! policy limits, the cache policy engine, and storage value types.

pub mod cache;
pub mod categories;
pub mod config;
pub mod error;
pub mod storage_types;

// Re-export commonly used types
pub use cache::{CacheDirective, Visibility};
pub use categories::{UploadCategory, UploadPolicy};
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::{ObjectRef, StorageBackend};
