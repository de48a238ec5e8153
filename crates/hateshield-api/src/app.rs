use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the Axum application
pub fn build_app(state: AppState) -> anyhow::Result<Router> {
    let cors = cors_layer(&state.settings.server)?;

    let app = Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/metrics", get(routes::metrics))
        .route("/analyze", post(routes::analyze))
        .route("/analyze/bulk", post(routes::analyze_bulk))
        .fallback(routes::fallback)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    Ok(app)
}

/// Credentialed CORS for the configured origins.
///
/// Browsers reject `*` together with credentials, so allowed methods and
/// headers mirror the preflight request instead.
fn cors_layer(config: &ServerConfig) -> anyhow::Result<CorsLayer> {
    let origins = config
        .cors_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", origin, e))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

/// Run the server until `shutdown` resolves
pub async fn run_server(
    state: AppState,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = build_app(state)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HateShield API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
