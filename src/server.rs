//! HTTP surface: axum router and handlers
//!
//! The routing layer is deliberately thin; all sequencing and failure policy
//! lives in the pipeline. Handlers only translate between JSON bodies and
//! pipeline calls, and map the error taxonomy onto status codes.

use crate::pipeline::{GeneratedImage, Pipeline};
use crate::request::{DeletionPayload, GenerationPayload};
use crate::Error;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

/// Build the service router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/test", get(liveness))
        .route("/generate-post", post(generate_post))
        .route("/delete-image", delete(delete_image))
        .with_state(state)
}

/// Wrapper so the pipeline error can implement `IntoResponse`
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

async fn generate_post(
    State(state): State<AppState>,
    Json(payload): Json<GenerationPayload>,
) -> Result<Json<GeneratedImage>, ApiError> {
    let generated = state.pipeline.generate(payload).await?;
    Ok(Json(generated))
}

async fn delete_image(
    State(state): State<AppState>,
    Json(payload): Json<DeletionPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let file_name = state.pipeline.delete(payload).await?;
    Ok(Json(json!({ "message": format!("{} deleted", file_name) })))
}

async fn welcome() -> Json<serde_json::Value> {
    Json(json!({ "message": "postframe image rendering service" }))
}

async fn liveness() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
