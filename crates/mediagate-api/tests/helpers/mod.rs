//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p mediagate-api --test serving_test` or
//! `cargo test -p mediagate-api`. The memory backend needs no external services.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use bytes::Bytes;
use mediagate_api::setup::{build_state, routes};
use mediagate_api::state::AppState;
use mediagate_core::{Config, ObjectRef, StorageBackend};
use mediagate_storage::{create_storage, PathResolver, Storage};

/// Service token every authenticated test request presents.
pub const TEST_SERVICE_TOKEN: &str = "test-service-token-at-least-32-characters-long";

/// Test application: in-memory storage, full router, bound test server.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn storage(&self) -> &dyn Storage {
        self.state.storage.as_ref()
    }

    /// Authorization header value for the configured service token.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", TEST_SERVICE_TOKEN)
    }

    /// Write an object directly into a backing bucket, bypassing the API.
    pub async fn seed_object(&self, bucket: &str, key: &str, content_type: &str, data: &[u8]) {
        let object = ObjectRef::new(bucket, key);
        self.state
            .storage
            .save(&object, content_type, Bytes::copy_from_slice(data))
            .await
            .expect("Failed to seed object");
    }
}

/// Two public search roots so resolution fallthrough is exercised; the second
/// root stands in for a legacy bucket layout.
pub fn test_config() -> Config {
    Config {
        server_port: 4000,
        cors_origins: vec!["*".to_string()],
        environment: "test".to_string(),
        log_json: false,
        service_token: TEST_SERVICE_TOKEN.to_string(),
        storage_backend: StorageBackend::Memory,
        s3_region: None,
        s3_endpoint: None,
        public_search_paths: vec![
            "/media-bucket/public".to_string(),
            "/legacy-bucket/assets".to_string(),
        ],
        private_object_root: "/media-bucket/.private".to_string(),
        storage_public_base_url: None,
        upload_grant_ttl_secs: 900,
        max_upload_bytes: 10 * 1024 * 1024,
        max_avatar_bytes: 1024 * 1024,
        product_content_types: vec![
            "image/jpeg".to_string(),
            "image/png".to_string(),
            "image/webp".to_string(),
        ],
        profile_content_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
        post_content_types: vec![
            "image/jpeg".to_string(),
            "image/png".to_string(),
            "video/mp4".to_string(),
        ],
        startup_diagnostics: false,
    }
}

/// Build state and router without binding a server. Wire-level tests drive
/// the router directly with `tower::ServiceExt::oneshot`.
pub fn build_test_parts() -> (Arc<AppState>, Router) {
    let config = test_config();
    let storage = create_storage(&config).expect("Failed to create storage backend");
    let resolver = Arc::new(
        PathResolver::new(
            config.public_search_paths.clone(),
            config.private_object_root.clone(),
            config.storage_public_base_url.clone(),
        )
        .expect("Failed to build path resolver"),
    );
    let state = build_state(config, storage, resolver);
    let router =
        routes::setup_routes(&state.config, state.clone()).expect("Failed to setup routes");
    (state, router)
}

/// Setup test app backed by the in-memory storage backend.
pub async fn setup_test_app() -> TestApp {
    let (state, app) = build_test_parts();
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");
    TestApp { server, state }
}
