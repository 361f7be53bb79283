//! Storage backend and path resolver construction.

use std::sync::Arc;

use anyhow::{Context, Result};
use mediagate_core::Config;
use mediagate_storage::{create_storage, run_diagnostics, PathResolver, Storage};

/// Build the configured storage backend and the resolver over its roots.
pub fn setup_storage(config: &Config) -> Result<(Arc<dyn Storage>, Arc<PathResolver>)> {
    let storage = create_storage(config).context("Failed to initialize storage backend")?;

    let resolver = PathResolver::new(
        config.public_search_paths.clone(),
        config.private_object_root.clone(),
        config.storage_public_base_url.clone(),
    )
    .context("Failed to build path resolver")?;

    Ok((storage, Arc::new(resolver)))
}

/// Run the startup write/read/delete round trip against the primary public
/// root. Failures are reported and logged, never fatal: the service can still
/// serve reads while an operator fixes write permissions.
pub async fn startup_diagnostics(storage: &dyn Storage, resolver: &PathResolver) {
    let report = run_diagnostics(storage, resolver.primary_public_root()).await;
    if report.healthy() {
        tracing::info!("startup storage diagnostics passed");
    } else {
        tracing::warn!(
            issues = ?report.issues,
            recommendations = ?report.recommendations,
            "startup storage diagnostics found problems"
        );
    }
}
