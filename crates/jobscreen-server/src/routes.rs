//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use jobscreen_core::{InferenceOutcome, JobPosting};
use serde_json::json;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_body_bytes;

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/predict", post(predict))
        .fallback(fallback)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({ "message": "Fake Job Detection API is running" }))
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

/// Screen one posting
async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<JobPosting>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(posting) = payload?;

    match state.service.infer(&posting).await? {
        InferenceOutcome::InsufficientData(body) => {
            debug!("Rejected short posting");
            Ok((StatusCode::BAD_REQUEST, Json(body)).into_response())
        }
        InferenceOutcome::Prediction(report) => Ok(Json(report).into_response()),
    }
}

async fn fallback() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

/// Error handling
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{1}")]
    InvalidRequest(StatusCode, String),

    #[error(transparent)]
    Pipeline(#[from] jobscreen_core::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        // Oversized bodies keep their 413; every other body problem is a 400
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        AppError::InvalidRequest(status, rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            AppError::InvalidRequest(status, _) => (*status, "invalid_request_error"),
            AppError::Pipeline(e) => {
                error!("Inference failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "inference_error")
            }
        };

        let body = json!({
            "error": {
                "message": self.to_string(),
                "type": kind,
            }
        });

        (status, Json(body)).into_response()
    }
}
