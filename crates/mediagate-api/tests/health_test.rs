//! Health and documentation endpoint tests.
//!
//! Run with: `cargo test -p mediagate-api --test health_test`

mod helpers;

use helpers::setup_test_app;

#[tokio::test]
async fn test_liveness() {
    let app = setup_test_app().await;

    let response = app.client().get("/health/live").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], serde_json::json!("alive"));
}

#[tokio::test]
async fn test_readiness_with_live_bucket() {
    let app = setup_test_app().await;

    let response = app.client().get("/health/ready").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], serde_json::json!("ready"));
    assert_eq!(body["storage"], serde_json::json!("ready"));
}

#[tokio::test]
async fn test_storage_diagnostics_report() {
    let app = setup_test_app().await;

    let response = app.client().get("/health/storage").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["bucket_exists"], serde_json::json!(true));
    assert_eq!(body["can_write"], serde_json::json!(true));
    assert_eq!(body["can_read"], serde_json::json!(true));
    assert_eq!(body["issues"], serde_json::json!([]));
}

#[tokio::test]
async fn test_health_endpoints_skip_auth() {
    let app = setup_test_app().await;

    for path in ["/health/live", "/health/ready", "/health/storage"] {
        let response = app.client().get(path).await;
        assert_eq!(response.status_code(), 200, "unexpected status for {}", path);
    }
}

#[tokio::test]
async fn test_openapi_spec_is_served() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["info"]["title"], serde_json::json!("Mediagate API"));

    let paths = body["paths"].as_object().expect("paths object");
    assert!(paths.contains_key("/secure-upload"));
    assert!(paths.contains_key("/upload-url"));
    assert!(paths.contains_key("/media/{path}"));
    assert!(paths.contains_key("/objects/{path}"));
}
