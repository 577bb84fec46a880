use crate::model::service::ClassifierService;
use crate::validation::UploadPolicy;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;

/// Shared Application State
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ClassifierService>,
    pub upload_policy: UploadPolicy,
    /// Present when the Prometheus recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(service: ClassifierService, upload_policy: UploadPolicy) -> Self {
        Self {
            service: Arc::new(service),
            upload_policy,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

// --- DTOs (Data Transfer Objects) ---

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "ok",
            message: "Server is healthy.",
        }
    }
}
