//! HateShield API server
//!
//! Serves the abusive-language classifier over HTTP.

use anyhow::Result;
use clap::Parser;
use hateshield_api::config::{Settings, API_TITLE, API_VERSION};
use hateshield_api::{run_server, AppState};
use hateshield_classifiers::{CandleModelLoader, InferenceAdapter};
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "hateshield-api")]
#[command(version, about = "HateShield abusive language detection API", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "HATESHIELD_CONFIG", default_value = "hateshield.yaml")]
    config: String,

    /// Listen address
    #[arg(short = 'l', long, env = "HATESHIELD_LISTEN")]
    listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long, env = "HATESHIELD_PORT")]
    port: Option<u16>,

    /// Load the model before accepting requests
    #[arg(long, env = "HATESHIELD_EAGER_LOAD")]
    eager_load: bool,

    /// Emit logs as JSON
    #[arg(long, env = "HATESHIELD_LOG_JSON")]
    log_json: bool,

    /// Enable verbose logging
    #[arg(short, long, env = "HATESHIELD_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_json);

    info!("Starting {} v{}", API_TITLE, API_VERSION);

    let mut settings = Settings::load(&cli.config)?;
    if let Some(listen) = &cli.listen {
        settings.server.listen = listen.clone();
    }
    if let Some(port) = cli.port {
        settings.server.port = port;
    }
    if cli.eager_load {
        settings.model.eager_load = true;
    }
    info!("Configuration loaded successfully");
    info!("Model: {}", settings.model.display_name());
    info!("Allowed origins: {:?}", settings.server.cors_origins);
    info!(
        "Database (unused): {} / {}",
        redact_credentials(&settings.database.uri),
        settings.database.name
    );

    let metrics_handle = init_metrics()?;

    let adapter = Arc::new(InferenceAdapter::new(CandleModelLoader::new(
        settings.model.clone(),
    )));
    if settings.model.eager_load {
        info!("Loading model before accepting requests...");
        adapter.warm_up().await?;
    } else {
        info!("Model will be loaded on the first request");
    }

    let addr: SocketAddr = format!("{}:{}", settings.server.listen, settings.server.port).parse()?;
    let state = AppState::new(adapter, settings).with_metrics(metrics_handle);

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    run_server(state, addr, shutdown).await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("hateshield=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("hateshield=info,tower_http=info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "hateshield_requests_total",
        "Total number of analysis requests by endpoint"
    );
    metrics::describe_counter!(
        "hateshield_texts_analyzed_total",
        "Total number of texts classified by category"
    );
    metrics::describe_histogram!(
        "hateshield_inference_latency_us",
        metrics::Unit::Microseconds,
        "Model inference latency in microseconds"
    );
    metrics::describe_counter!("hateshield_errors_total", "Total number of errors by kind");

    info!("Metrics exporter initialized");
    Ok(handle)
}

/// Hide the password part of a connection string before logging it
fn redact_credentials(uri: &str) -> String {
    match (uri.find("://"), uri.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &uri[..scheme_end], &uri[at..])
        }
        _ => uri.to_string(),
    }
}
