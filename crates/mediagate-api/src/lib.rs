//! Mediagate API Library
//!
//! This crate provides the HTTP API handlers, auth middleware, upload gateway
//! service, and application setup.

// Module declarations
mod api_doc;
pub mod constants;
mod handlers;
pub mod setup;

// Public modules
pub mod auth;
pub mod error;
pub mod services;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::avatar::{AvatarMedia, AvatarUploadOptions, AvatarUploadResult};
pub use services::gateway::{UploadDescriptor, UploadGateway, UploadOutcome};
