use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ndarray::ShapeError;
use serde_json::json;
use thiserror::Error;

/// Message returned for every processing failure; the detail stays in the logs.
pub const GENERIC_PROCESSING_ERROR: &str =
    "An internal error occurred while processing the image.";

#[derive(Error, Debug)]
pub enum InferenceError {
    // Client input errors (4xx)
    #[error("No file part in the request")]
    MissingFile,

    #[error("No selected file")]
    EmptyFilename,

    #[error("Invalid file type. Allowed types: {}", .allowed.join(", "))]
    InvalidFileType { allowed: Vec<String> },

    #[error("File exceeds the upload size limit")]
    UploadTooLarge,

    #[error("Malformed upload: {0}")]
    MalformedUpload(MultipartError),

    // Model and processing errors (500)
    #[error("Model is not loaded. Please check server logs.")]
    ModelNotLoaded,

    #[error("Model not found at path: {0}")]
    ModelNotFound(String),

    #[error("ONNX Runtime error: {0}")]
    OrtError(#[from] ort::Error),

    #[error("Image processing error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Shape error: {0}")]
    ShapeError(#[from] ShapeError),

    #[error("Model produced {got} scores but {expected} labels are configured")]
    OutputMismatch { expected: usize, got: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl InferenceError {
    /// True for failures caused by the caller's input rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            InferenceError::MissingFile
                | InferenceError::EmptyFilename
                | InferenceError::InvalidFileType { .. }
                | InferenceError::UploadTooLarge
                | InferenceError::MalformedUpload(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        if matches!(self, InferenceError::UploadTooLarge) {
            StatusCode::PAYLOAD_TOO_LARGE
        } else if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    /// Short label used for the `kind` metric dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            InferenceError::MissingFile => "missing_file",
            InferenceError::EmptyFilename => "empty_filename",
            InferenceError::InvalidFileType { .. } => "invalid_file_type",
            InferenceError::UploadTooLarge => "upload_too_large",
            InferenceError::MalformedUpload(_) => "malformed_upload",
            InferenceError::ModelNotLoaded => "model_not_loaded",
            InferenceError::ModelNotFound(_) => "model_not_found",
            InferenceError::OrtError(_) => "runtime",
            InferenceError::ImageError(_) => "image",
            InferenceError::ShapeError(_) => "shape",
            InferenceError::OutputMismatch { .. } => "output_mismatch",
            InferenceError::Internal(_) => "internal",
        }
    }
}

impl From<MultipartError> for InferenceError {
    fn from(err: MultipartError) -> Self {
        // The body limit surfaces as a multipart error carrying 413
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            InferenceError::UploadTooLarge
        } else {
            InferenceError::MalformedUpload(err)
        }
    }
}

impl IntoResponse for InferenceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message =
            if self.is_client_error() || matches!(self, InferenceError::ModelNotLoaded) {
                self.to_string()
            } else {
                tracing::error!(error = %self, "An error occurred during prediction");
                GENERIC_PROCESSING_ERROR.to_string()
            };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
