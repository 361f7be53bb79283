//! Wire-level gateway tests driving the router directly.
//!
//! Run with: `cargo test -p mediagate-api --test gateway_wire_test`
//! These build raw requests so Content-Length can disagree with the bytes
//! actually sent, which a well-behaved HTTP client never produces.

mod helpers;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use bytes::Bytes;
use futures::StreamExt;
use http_body_util::BodyExt;
use tower::ServiceExt;

use helpers::TEST_SERVICE_TOKEN;

fn chunked_body(chunks: Vec<Result<Bytes, std::io::Error>>) -> Body {
    Body::from_stream(futures::stream::iter(chunks))
}

/// Body that counts how many chunks the server actually pulled.
fn counting_body(chunks: Vec<Result<Bytes, std::io::Error>>) -> (Body, Arc<AtomicUsize>) {
    let polled = Arc::new(AtomicUsize::new(0));
    let counter = polled.clone();
    let stream = futures::stream::iter(chunks).inspect(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (Body::from_stream(stream), polled)
}

fn upload_request(content_length: Option<&str>, content_type: &str, body: Body) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/secure-upload")
        .header("Authorization", format!("Bearer {}", TEST_SERVICE_TOKEN))
        .header("x-image-type", "post")
        .header("x-file-type", content_type)
        .header("x-file-name", "clip.mp4");
    if let Some(len) = content_length {
        builder = builder.header("content-length", len);
    }
    builder.body(body).unwrap()
}

async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_missing_content_length_is_411() {
    let (_state, router) = helpers::build_test_parts();

    let request = upload_request(
        None,
        "video/mp4",
        chunked_body(vec![Ok(Bytes::from_static(b"abc"))]),
    );
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::LENGTH_REQUIRED);
    let body = json_body(response).await;
    assert_eq!(body["code"], serde_json::json!("LENGTH_REQUIRED"));
}

#[tokio::test]
async fn test_declared_shortfall_is_rejected_and_discarded() {
    let (state, router) = helpers::build_test_parts();

    let chunks: Vec<Result<Bytes, std::io::Error>> =
        (0..4).map(|_| Ok(Bytes::from(vec![1u8; 1000]))).collect();
    let request = upload_request(Some("5000"), "video/mp4", chunked_body(chunks));
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], serde_json::json!("SIZE_MISMATCH"));
    let message = body["message"].as_str().unwrap_or("");
    assert!(message.contains("5000"), "message: {}", message);
    assert!(message.contains("4000"), "message: {}", message);

    let stored = state
        .storage
        .list_objects("media-bucket", "public/post", 100)
        .await
        .unwrap();
    assert!(stored.is_empty(), "short upload must leave nothing behind");
}

#[tokio::test]
async fn test_overrun_aborts_without_draining() {
    let (state, router) = helpers::build_test_parts();

    let (body, polled) = counting_body(vec![
        Ok(Bytes::from_static(b"fill")),
        Ok(Bytes::from_static(b"up")),
        Ok(Bytes::from_static(b"...")),
    ]);
    let request = upload_request(Some("4"), "video/mp4", body);
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["code"], serde_json::json!("SIZE_MISMATCH"));

    // The second chunk crossed the declared length; the third was never read.
    assert_eq!(polled.load(Ordering::SeqCst), 2);

    let stored = state
        .storage
        .list_objects("media-bucket", "public/post", 100)
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_rejected_type_never_reads_body() {
    let (_state, router) = helpers::build_test_parts();

    let (body, polled) = counting_body(vec![Ok(Bytes::from_static(b"0123456789"))]);
    let request = upload_request(Some("10"), "application/zip", body);
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["code"], serde_json::json!("INVALID_REQUEST"));
    assert_eq!(polled.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_interrupted_stream_maps_to_invalid_request() {
    let (state, router) = helpers::build_test_parts();

    let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
        Ok(Bytes::from_static(b"start")),
        Err(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "connection reset",
        )),
    ];
    let request = upload_request(Some("100"), "video/mp4", chunked_body(chunks));
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["code"], serde_json::json!("INVALID_REQUEST"));

    let stored = state
        .storage
        .list_objects("media-bucket", "public/post", 100)
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_chunked_body_with_exact_length_commits() {
    let (state, router) = helpers::build_test_parts();

    let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
        Ok(Bytes::from_static(b"hello ")),
        Ok(Bytes::from_static(b"world")),
    ];
    let request = upload_request(Some("11"), "video/mp4", chunked_body(chunks));
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["success"], serde_json::json!(true));
    assert_eq!(json["size"], serde_json::json!(11));

    let stored = state
        .storage
        .list_objects("media-bucket", "public/post", 100)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    let stat = state.storage.stat(&stored[0]).await.unwrap();
    assert_eq!(stat.size, 11);
    assert_eq!(stat.content_type.as_deref(), Some("video/mp4"));
}
