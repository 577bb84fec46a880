use clap::Parser;
use reptile_classifier::{
    config::AppConfig,
    model::{loader, service::ClassifierService, Classifier},
    server::{routes, types::AppState},
    telemetry,
    validation::UploadPolicy,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "reptile-classifier")]
#[command(about = "Classify uploaded reptile photos over HTTP", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Listen address, overrides the config file
    #[arg(short = 'l', long)]
    host: Option<String>,

    /// Listen port, overrides the config file
    #[arg(short = 'P', long)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1. Init
    telemetry::init_tracing(cli.verbose);

    // 2. Load Config
    let mut config = AppConfig::load(&cli.config)?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    // 3. Initialize Model; a failed load leaves the server up in degraded mode
    loader::init_ort();
    let model_conf = &config.model;
    info!(path = %model_conf.path.display(), "Loading model");
    let service = match loader::OnnxClassifier::load(&model_conf.path, model_conf.intra_threads) {
        Ok(classifier) => {
            let classifier: Arc<dyn Classifier> = Arc::new(classifier);
            ClassifierService::new(classifier, model_conf.labels.clone(), model_conf.input_size)
        }
        Err(e) => {
            error!(error = %e, "Error loading model");
            ClassifierService::degraded(model_conf.labels.clone(), model_conf.input_size)
        }
    };

    // 4. Create Router
    let mut state = AppState::new(
        service,
        UploadPolicy::new(&model_conf.allowed_extensions),
    );
    if config.server.metrics {
        state = state.with_metrics(telemetry::init_metrics()?);
    }
    let app = routes::create_router(state, config.server.max_upload_bytes);

    // 5. Bind & Serve
    let listener =
        TcpListener::bind(format!("{}:{}", config.server.host, config.server.port)).await?;
    info!(
        "Server listening on http://{}:{}",
        config.server.host, config.server.port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            warn!("Shutdown signal received, stopping server...");
        })
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
