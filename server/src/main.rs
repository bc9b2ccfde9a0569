use std::sync::Arc;

use anyhow::Context;
use docpolish::DocumentService;
use tokio::net::TcpListener;

use docpolish_server::config::ServerConfig;
use docpolish_server::state::AppState;
use docpolish_server::{build_app, logging, ws};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let server_config = ServerConfig::from_env()?;
    logging::init_tracing(server_config.json_logs)?;

    let config = docpolish::load_effective_config(server_config.config_path.as_deref())
        .context("Failed to load configuration")?;
    tracing::info!(
        llm_service_url = %config.llm.service_url,
        model = %config.llm.model_name,
        max_concurrent_jobs = ?config.executor.max_concurrent_jobs,
        "Loaded pipeline configuration"
    );

    let service = Arc::new(DocumentService::from_config(config)?);
    let ws_manager = Arc::new(ws::WsManager::new());

    let bridge_handle = ws::start_event_bridge(service.subscribe(), Arc::clone(&ws_manager));
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager));

    let state = AppState {
        service: Arc::clone(&service),
        config: Arc::new(server_config.clone()),
        ws_manager: Arc::clone(&ws_manager),
    };
    let app = build_app(state);

    let addr = server_config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    tracing::info!(%addr, version = env!("CARGO_PKG_VERSION"), "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shutting down");
    service.shutdown();
    ws_manager.shutdown_all().await;
    heartbeat_handle.abort();
    bridge_handle.abort();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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
