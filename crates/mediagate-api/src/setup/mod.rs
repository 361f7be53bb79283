//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from
//! main.rs for better organization and testability.

pub mod routes;
pub mod server;
pub mod storage;
pub mod telemetry;

use std::sync::Arc;

use anyhow::{Context, Result};
use mediagate_core::{Config, UploadPolicy};
use mediagate_storage::{GrantIssuer, PathResolver, Storage};

use crate::services::avatar::{AvatarMedia, StorageAvatarMedia};
use crate::services::gateway::UploadGateway;
use crate::state::{AppState, GrantState};

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    telemetry::init_telemetry(&config);

    tracing::info!(
        backend = %config.storage_backend,
        environment = %config.environment,
        "Configuration loaded and validated successfully"
    );

    let (storage, resolver) = storage::setup_storage(&config)?;

    if config.startup_diagnostics {
        storage::startup_diagnostics(storage.as_ref(), &resolver).await;
    }

    let state = build_state(config, storage, resolver);
    let router = routes::setup_routes(&state.config, state.clone())?;

    Ok((state, router))
}

/// Wire services and sub-states into the shared application state.
pub fn build_state(
    config: Config,
    storage: Arc<dyn Storage>,
    resolver: Arc<PathResolver>,
) -> Arc<AppState> {
    let policy = UploadPolicy::from_config(&config);
    let issuer = Arc::new(GrantIssuer::new(
        storage.clone(),
        config.upload_grant_ttl_secs,
    ));
    let avatars: Arc<dyn AvatarMedia> =
        Arc::new(StorageAvatarMedia::new(storage.clone(), resolver.clone()));
    let gateway = Arc::new(UploadGateway::new(
        storage.clone(),
        resolver.clone(),
        avatars.clone(),
    ));

    let is_production = config.is_production();
    Arc::new(AppState {
        grants: GrantState {
            issuer,
            resolver: resolver.clone(),
            policy: policy.clone(),
        },
        config,
        storage,
        resolver,
        gateway,
        avatars,
        policy,
        is_production,
    })
}
