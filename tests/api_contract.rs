//! HTTP contract tests against the router with a stub renderer
//!
//! These run without Chrome: the renderer behind the trait seam is replaced
//! by a counting stub so launch behaviour can be asserted directly.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use sceneshot::handlers::AppState;
use sceneshot::server::create_app;
use sceneshot::{Error, RenderRequest, RenderedImage, SceneRenderer};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

/// What the stub renderer should do when invoked
#[derive(Clone, Copy)]
enum StubBehavior {
    Succeed,
    FailWith(&'static str),
    TimeOut,
}

struct StubRenderer {
    calls: Arc<AtomicUsize>,
    behavior: StubBehavior,
}

impl SceneRenderer for StubRenderer {
    fn render(&self, request: &RenderRequest) -> sceneshot::Result<RenderedImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            StubBehavior::Succeed => Ok(RenderedImage {
                bytes: b"\x89PNG\r\n\x1a\nstub".to_vec(),
                format: request.format,
            }),
            StubBehavior::FailWith(detail) => Err(Error::RenderError(detail.to_string())),
            StubBehavior::TimeOut => Err(Error::Timeout(15_000)),
        }
    }
}

fn app_with_stub(behavior: StubBehavior) -> (axum::Router, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let state = AppState {
        renderer: Arc::new(StubRenderer {
            calls: calls.clone(),
            behavior,
        }),
    };
    (create_app(state), calls)
}

fn post_render(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/render")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}

#[tokio::test]
async fn missing_canvas_data_is_rejected_without_launching() {
    let (app, calls) = app_with_stub(StubBehavior::Succeed);

    let response = app
        .oneshot(post_render(json!({ "width": 400 })))
        .await
        .expect("router");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("canvas_data"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_body_is_rejected_without_launching() {
    let (app, calls) = app_with_stub(StubBehavior::Succeed);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/render")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("build request");

    let response = app.oneshot(request).await.expect("router");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn oversized_dimensions_are_rejected_without_launching() {
    let (app, calls) = app_with_stub(StubBehavior::Succeed);

    let response = app
        .oneshot(post_render(json!({ "canvas_data": {}, "width": 100_000 })))
        .await
        .expect("router");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unsupported_method_yields_405_json() {
    let (app, calls) = app_with_stub(StubBehavior::Succeed);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/render")
        .body(Body::empty())
        .expect("build request");

    let response = app.oneshot(request).await.expect("router");
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Method not allowed");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn preflight_probe_is_permissive() {
    let (app, _calls) = app_with_stub(StubBehavior::Succeed);

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/render")
        .header(header::ORIGIN, "https://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .expect("build request");

    let response = app.oneshot(request).await.expect("router");
    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .expect("CORS header"),
        "*"
    );
}

#[tokio::test]
async fn successful_render_returns_matching_data_url() {
    let (app, calls) = app_with_stub(StubBehavior::Succeed);

    let response = app
        .oneshot(post_render(json!({
            "canvas_data": { "objects": [] },
            "width": 400,
            "height": 300
        })))
        .await
        .expect("router");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert!(body["image_url"]
        .as_str()
        .expect("image_url")
        .starts_with("data:image/png;base64,"));
    assert!(body["processing_time"].is_u64());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn jpeg_format_sets_jpeg_media_type() {
    let (app, _calls) = app_with_stub(StubBehavior::Succeed);

    let response = app
        .oneshot(post_render(json!({
            "canvas_data": { "objects": [] },
            "format": "jpeg",
            "quality": 0.5
        })))
        .await
        .expect("router");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["image_url"]
        .as_str()
        .expect("image_url")
        .starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn page_failure_surfaces_detail_in_500() {
    let (app, calls) = app_with_stub(StubBehavior::FailWith("fabric is not defined"));

    let response = app
        .oneshot(post_render(json!({ "canvas_data": {} })))
        .await
        .expect("router");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Rendering failed");
    assert!(body["details"]
        .as_str()
        .expect("details")
        .contains("fabric is not defined"));
    assert!(body["processing_time"].is_u64());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn timeout_is_reported_distinctly() {
    let (app, _calls) = app_with_stub(StubBehavior::TimeOut);

    let response = app
        .oneshot(post_render(json!({ "canvas_data": {} })))
        .await
        .expect("router");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Rendering timed out");
    assert!(body["details"]
        .as_str()
        .expect("details")
        .contains("15000ms"));
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let (app, _calls) = app_with_stub(StubBehavior::Succeed);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/health")
        .body(Body::empty())
        .expect("build request");

    let response = app.oneshot(request).await.expect("router");
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}
