use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::service::{DetailedScoreRequest, PredictRequest, ScoringService, ScoringServiceError};

/// Router builder exposing the scoring endpoints.
pub fn scoring_router(service: Arc<ScoringService>) -> Router {
    Router::new()
        .route("/", get(status_handler))
        .route("/predict", post(predict_handler))
        .route("/api/v1/score", post(detailed_score_handler))
        .route("/model-info", get(model_info_handler))
        .with_state(service)
}

pub(crate) async fn status_handler(State(service): State<Arc<ScoringService>>) -> Response {
    (StatusCode::OK, Json(service.status())).into_response()
}

pub(crate) async fn predict_handler(
    State(service): State<Arc<ScoringService>>,
    Json(request): Json<PredictRequest>,
) -> Response {
    let response = service.predict(request).await;
    (StatusCode::OK, Json(response)).into_response()
}

pub(crate) async fn detailed_score_handler(
    State(service): State<Arc<ScoringService>>,
    Json(request): Json<DetailedScoreRequest>,
) -> Response {
    match service.score_detailed(request).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn model_info_handler(State(service): State<Arc<ScoringService>>) -> Response {
    match service.model_info() {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ScoringServiceError) -> Response {
    let status = match &error {
        ScoringServiceError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ScoringServiceError::Transcript(_) | ScoringServiceError::InvalidExternalScore(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ScoringServiceError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}
