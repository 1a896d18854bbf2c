//! HTTP surface tests: routing, status mapping, and response shapes

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use postframe::pipeline::Pipeline;
use postframe::rasterizer::Rasterizer;
use postframe::server::{router, AppState};
use postframe::storage::{DestroyOutcome, StorageGateway, UploadResult};
use postframe::{Error, Result};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

struct StubRasterizer {
    fail: bool,
}

impl Rasterizer for StubRasterizer {
    fn capture(&self, _document: &str, output: &Path) -> Result<()> {
        if self.fail {
            return Err(Error::RenderFailure("stub capture exploded".into()));
        }
        std::fs::write(output, b"\xff\xd8stub-jpeg").expect("stub write");
        Ok(())
    }
}

struct StubStorage;

#[async_trait]
impl StorageGateway for StubStorage {
    async fn upload(&self, _local_path: &Path, _desired_name: &str) -> Result<UploadResult> {
        Ok(UploadResult {
            secure_url: "https://cdn.example/stub.jpg".into(),
            public_id: "processed_images/stub".into(),
        })
    }

    async fn destroy(&self, _public_id: &str) -> Result<DestroyOutcome> {
        Ok(DestroyOutcome::Destroyed)
    }
}

fn app(render_fails: bool) -> (axum::Router, tempfile::TempDir) {
    let scratch = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(
        Arc::new(StubRasterizer { fail: render_fails }),
        Arc::new(StubStorage),
        scratch.path().to_path_buf(),
    );
    let router = router(AppState {
        pipeline: Arc::new(pipeline),
    });
    (router, scratch)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn generate_post_returns_url_and_file_name() {
    let (app, _scratch) = app(false);
    let request = json_request(
        Method::POST,
        "/generate-post",
        json!({
            "imageUrl": "https://x/a.png",
            "logoUrl": "https://x/b.png",
            "text01": "A",
            "focusText": "B",
            "text02": "C"
        }),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["imageUrl"], "https://cdn.example/stub.jpg");
    assert_eq!(body["fileName"], "processed_images/stub");
}

#[tokio::test]
async fn generate_post_validation_failure_is_400() {
    let (app, _scratch) = app(false);
    let request = json_request(
        Method::POST,
        "/generate-post",
        json!({
            "imageUrl": "https://x/a.png",
            "logoUrl": "https://x/b.png",
            "text01": "A",
            "focusText": "B",
            "text02": "C",
            "focusTextColor": "#12"
        }),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("focusTextColor"));
}

#[tokio::test]
async fn generate_post_render_failure_is_500() {
    let (app, _scratch) = app(true);
    let request = json_request(
        Method::POST,
        "/generate-post",
        json!({
            "imageUrl": "https://x/a.png",
            "logoUrl": "https://x/b.png",
            "text01": "A",
            "focusText": "B",
            "text02": "C"
        }),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("Rendering failed"));
}

#[tokio::test]
async fn delete_image_round_trip() {
    let (app, _scratch) = app(false);
    let request = json_request(
        Method::DELETE,
        "/delete-image",
        json!({ "fileName": "processed_image_1700000000000.jpg" }),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("processed_image_1700000000000.jpg"));
}

#[tokio::test]
async fn delete_image_rejects_invalid_name() {
    let (app, _scratch) = app(false);
    let request = json_request(
        Method::DELETE,
        "/delete-image",
        json!({ "fileName": "../etc/passwd" }),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn liveness_endpoints() {
    let (app, _scratch) = app(false);
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/test").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
