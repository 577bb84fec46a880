use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging. `RUST_LOG` wins unless `verbose` is set.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("reptile_classifier=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("reptile_classifier=info,tower_http=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Install the Prometheus recorder and return the handle used by `/metrics`.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "predict_requests_total",
        "Prediction requests by outcome"
    );
    metrics::describe_counter!("predict_errors_total", "Prediction failures by kind");
    metrics::describe_histogram!(
        "inference_duration_seconds",
        metrics::Unit::Seconds,
        "Time spent decoding and classifying an upload"
    );

    tracing::info!("Metrics exporter initialized");
    Ok(handle)
}
