//! Exporter server bootstrap and router wiring.

use super::*;

/// Serves the exporter until Ctrl-C.
pub async fn run_exporter_server(
    config: ExporterServerConfig,
    collectors: CollectorSet,
) -> Result<()> {
    let bind_addr = config
        .bind
        .parse::<SocketAddr>()
        .with_context(|| format!("invalid --listen '{}'", config.bind))?;

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind exporter server on {bind_addr}"))?;
    let local_addr = listener
        .local_addr()
        .context("failed to resolve bound exporter server address")?;
    tracing::info!(
        addr = %local_addr,
        endpoint = METRICS_ENDPOINT,
        "exporter server listening"
    );

    let state = Arc::new(ExporterServerState::new(collectors, config.version));
    let app = build_exporter_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("exporter server exited unexpectedly")?;

    tracing::info!("exporter server stopped");
    Ok(())
}

pub fn build_exporter_router(state: Arc<ExporterServerState>) -> Router {
    Router::new()
        .route(METRICS_ENDPOINT, get(handle_metrics))
        .route(HEALTHZ_ENDPOINT, get(handle_healthz))
        .route(VERSION_ENDPOINT, get(handle_version))
        .with_state(state)
}
