//! Axum router and the `/predict` request handler.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use emotive_inference::{EmotionError, EmotionLabel, InferenceService};

use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::staging::StagedAudio;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// The inference pipeline.
    pub service: Arc<InferenceService>,
    /// Directory for per-request staged uploads.
    pub staging_dir: Arc<PathBuf>,
    /// When the server started.
    pub start_time: Instant,
}

/// Build the Axum router with all routes.
pub fn build_router(service: Arc<InferenceService>, config: &ServerConfig) -> Router {
    let state = AppState {
        service,
        staging_dir: Arc::new(config.staging_dir.clone()),
        start_time: Instant::now(),
    };

    Router::new()
        .route("/predict", post(predict_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Successful classification envelope: `{"emotion": "<label>"}`.
#[derive(Debug, Serialize)]
struct PredictResponse {
    emotion: EmotionLabel,
}

/// Failure envelope: `{"error": "<message>"}`.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Boundary error classification: client-caused vs. server-caused.
#[derive(Debug)]
enum ApiError {
    /// The request itself was unusable (missing/empty/bad attachment).
    BadRequest(String),
    /// The pipeline failed (decode, features, model, inference).
    Internal(String),
}

impl From<EmotionError> for ApiError {
    fn from(err: EmotionError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, mut message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        // The error field must never be empty.
        if message.is_empty() {
            message = "unknown error occurred".into();
        }
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// POST /predict — classify one uploaded clip.
///
/// Expects a multipart form with the audio bytes under the `file` field.
/// The staged copy is owned by this handler and removed on every exit path.
async fn predict_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let mut multipart = multipart
        .map_err(|e| ApiError::BadRequest(format!("expected multipart form data: {e}")))?;

    let mut audio_bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart request: {e}")))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("failed to read \"file\" field: {e}")))?;
            audio_bytes = Some(bytes);
            break;
        }
    }

    let Some(bytes) = audio_bytes else {
        return Err(ApiError::BadRequest(
            "POST a .wav file with \"file\" field".into(),
        ));
    };
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("empty \"file\" attachment".into()));
    }

    let staged = StagedAudio::stage(&state.staging_dir, &bytes)
        .map_err(|e| ApiError::Internal(format!("failed to stage upload: {e}")))?;

    // The pipeline is CPU/IO-bound; run it off the async runtime. `staged`
    // stays owned here so the file outlives the blocking task and is
    // removed when this scope exits, whatever the outcome.
    let service = state.service.clone();
    let clip_path = staged.path().to_path_buf();
    let outcome = tokio::task::spawn_blocking(move || service.classify_file(&clip_path))
        .await
        .map_err(|e| ApiError::Internal(format!("inference task failed: {e}")))?;

    match outcome {
        Ok(emotion) => {
            info!(%emotion, "classified clip");
            Ok(Json(PredictResponse { emotion }))
        }
        Err(err) => {
            warn!(error = %err, "classification failed");
            Err(err.into())
        }
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.service.registry().is_loaded();
    Json(health::health_check(state.start_time, model_loaded))
}
