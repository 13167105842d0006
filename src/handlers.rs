//! HTTP handlers: POST /api/render, GET /api/health

use crate::renderer::SceneRenderer;
use crate::scene::RenderRequest;
use crate::Error;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use base64::Engine as Base64Engine;
use log::info;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Shared handler state: the renderer backend behind the trait seam
#[derive(Clone)]
pub struct AppState {
    pub renderer: Arc<dyn SceneRenderer>,
}

/// Successful render response
#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub success: bool,
    pub image_url: String,
    pub processing_time: u64,
}

/// Client error body (bad request, method not allowed)
#[derive(Debug, Serialize)]
pub struct ClientErrorResponse {
    pub error: String,
}

/// Server-side failure body
#[derive(Debug, Serialize)]
pub struct FailureResponse {
    pub success: bool,
    pub error: String,
    pub details: String,
    pub processing_time: u64,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// POST /api/render - render a canvas scene and return it as a data URL
pub async fn render_scene(State(state): State<AppState>, body: Bytes) -> Response {
    let started = Instant::now();

    match run_render(state, body).await {
        Ok(image_url) => {
            let processing_time = elapsed_ms(started);
            info!("render succeeded in {}ms", processing_time);
            (
                StatusCode::OK,
                Json(RenderResponse {
                    success: true,
                    image_url,
                    processing_time,
                }),
            )
                .into_response()
        }
        Err(err) if err.is_client_error() => (
            StatusCode::BAD_REQUEST,
            Json(ClientErrorResponse {
                error: err.to_string(),
            }),
        )
            .into_response(),
        Err(err) => {
            // Timeouts get their own headline so callers can tell them apart
            // from in-page failures; the body shape is otherwise identical.
            let error = if matches!(err, Error::Timeout(_)) {
                "Rendering timed out"
            } else {
                "Rendering failed"
            };
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(FailureResponse {
                    success: false,
                    error: error.to_string(),
                    details: err.to_string(),
                    processing_time: elapsed_ms(started),
                }),
            )
                .into_response()
        }
    }
}

/// Fallback for registered paths hit with an unsupported method
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ClientErrorResponse {
            error: "Method not allowed".to_string(),
        }),
    )
        .into_response()
}

/// GET /api/health - liveness probe
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Validate, render on a blocking worker, and assemble the data URL.
///
/// Validation failures return before any browser is launched; the renderer
/// itself guarantees browser cleanup on its own error paths.
async fn run_render(state: AppState, body: Bytes) -> crate::Result<String> {
    let request: RenderRequest = serde_json::from_slice(&body)
        .map_err(|e| Error::InvalidRequest(format!("invalid request body: {}", e)))?;
    request.validate()?;

    // The CDP client blocks, so renders run off the async executor.
    let renderer = state.renderer.clone();
    let image = tokio::task::spawn_blocking(move || renderer.render(&request))
        .await
        .map_err(|e| Error::RenderError(format!("render task failed: {}", e)))??;

    Ok(format!(
        "data:{};base64,{}",
        image.format.media_type(),
        base64::engine::general_purpose::STANDARD.encode(&image.bytes)
    ))
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
