use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;

use crate::error::InferenceError;
use crate::model::service::Prediction;
use crate::server::types::*;
use crate::validation::UploadPolicy;

/// Name of the multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Vec<Prediction>>, InferenceError> {
    match run_prediction(&state, multipart).await {
        Ok(predictions) => {
            counter!("predict_requests_total", "outcome" => "ok").increment(1);
            Ok(Json(predictions))
        }
        Err(e) => {
            let outcome = if e.is_client_error() {
                "client_error"
            } else {
                "server_error"
            };
            counter!("predict_requests_total", "outcome" => outcome).increment(1);
            counter!("predict_errors_total", "kind" => e.kind()).increment(1);
            if e.is_client_error() {
                tracing::debug!(error = %e, "Rejected upload");
            }
            Err(e)
        }
    }
}

async fn run_prediction(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Vec<Prediction>, InferenceError> {
    // 1. Model must be available
    if !state.service.is_loaded() {
        return Err(InferenceError::ModelNotLoaded);
    }

    // 2. Locate and validate the upload; a non-multipart body has no file part
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(%rejection, "Request is not a multipart upload");
        InferenceError::MissingFile
    })?;
    let image_bytes = read_file_field(&mut multipart, &state.upload_policy).await?;

    // 3. Preprocess + inference, off the async workers
    let service = Arc::clone(&state.service);
    let start = Instant::now();
    let predictions = tokio::task::spawn_blocking(move || service.classify(&image_bytes))
        .await
        .map_err(|e| InferenceError::Internal(format!("classification task failed: {}", e)))??;
    let duration = start.elapsed();

    histogram!("inference_duration_seconds").record(duration.as_secs_f64());
    if let Some(top) = predictions.first() {
        tracing::info!(
            class = %top.label,
            confidence = top.confidence,
            inference_time_ms = duration.as_secs_f64() * 1000.0,
            "Prediction complete"
        );
    }

    Ok(predictions)
}

/// Returns the content of the first `file` part that carries a filename.
async fn read_file_field(
    multipart: &mut Multipart,
    policy: &UploadPolicy,
) -> Result<Bytes, InferenceError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // Without a filename the part is a plain form value, not a file
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };

        policy.validate(Some(&file_name))?;
        return Ok(field.bytes().await?);
    }

    Err(InferenceError::MissingFile)
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
