//! Application state and sub-state extractors.
//!
//! AppState is split into domain sub-states so handlers can extract only what
//! they need via Axum's `FromRef`, and to avoid a single god object.

use std::sync::Arc;

use mediagate_core::{Config, UploadPolicy};
use mediagate_storage::{GrantIssuer, PathResolver, Storage};

use crate::services::avatar::AvatarMedia;
use crate::services::gateway::UploadGateway;

// ----- Sub-state types -----

/// Storage access for the read path: object resolution plus the backend.
#[derive(Clone)]
pub struct ServingState {
    pub storage: Arc<dyn Storage>,
    pub resolver: Arc<PathResolver>,
}

/// Everything the presigned-grant path needs.
#[derive(Clone)]
pub struct GrantState {
    pub issuer: Arc<GrantIssuer>,
    pub resolver: Arc<PathResolver>,
    pub policy: UploadPolicy,
}

// ----- AppState -----

/// Main application state: aggregates sub-states for dependency injection.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub resolver: Arc<PathResolver>,
    pub grants: GrantState,
    pub gateway: Arc<UploadGateway>,
    pub avatars: Arc<dyn AvatarMedia>,
    pub policy: UploadPolicy,
    pub is_production: bool,
}

impl AppState {
    pub fn serving(&self) -> ServingState {
        ServingState {
            storage: self.storage.clone(),
            resolver: self.resolver.clone(),
        }
    }
}

// ----- FromRef for sub-state extraction -----

impl axum::extract::FromRef<Arc<AppState>> for ServingState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.serving()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for GrantState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.grants.clone()
    }
}
