//! JobScreen Server
//!
//! HTTP inference server for fraudulent job posting detection.

use anyhow::Result;
use clap::Parser;
use jobscreen_server::{create_router, AppState, Cli, ServerConfig};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("Starting JobScreen server");

    let config = ServerConfig::load(&cli.config, &cli)?;
    info!("Configuration loaded successfully");
    info!("Model: {:?}", config.artifacts.model);
    info!("Vocabulary: {:?}", config.artifacts.vocabulary);
    info!(
        "Thresholds: suspicious={} fake={}",
        config.thresholds.suspicious, config.thresholds.fake
    );

    let metrics_handle = init_metrics()?;

    // Artifacts must load before the listener binds
    info!("Loading model artifacts...");
    let state = AppState::from_config(&config, metrics_handle).await?;
    info!("Model artifacts loaded");

    let addr = config.socket_addr()?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
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

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("jobscreen=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jobscreen=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "jobscreen_requests_total",
        "Total number of screening requests"
    );
    metrics::describe_counter!(
        "jobscreen_predictions_total",
        "Total number of predictions by label"
    );
    metrics::describe_counter!(
        "jobscreen_insufficient_data_total",
        "Requests rejected before inference for being too short"
    );
    metrics::describe_histogram!(
        "jobscreen_inference_latency_us",
        metrics::Unit::Microseconds,
        "Encode, pad and forward pass latency in microseconds"
    );
    metrics::describe_counter!("jobscreen_errors_total", "Total number of errors by type");

    info!("Metrics exporter initialized");
    Ok(handle)
}
