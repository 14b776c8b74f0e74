use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::application::routes::app_router;
use crate::application::state::{AppState, AppStateConfig};
use crate::domain::config::ReportConfig;

pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub youtube_api_url: String,
    pub default_api_key: Option<String>,
    pub report_defaults: ReportConfig,
}

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    // Reject a bad default configuration at startup rather than on every request.
    config
        .report_defaults
        .validate()
        .context("invalid default report configuration")?;

    let state = AppState::from_config(AppStateConfig {
        youtube_api_url: config.youtube_api_url.clone(),
        default_api_key: config.default_api_key,
        report_defaults: config.report_defaults,
    })?;

    if state.default_api_key.is_none() {
        warn!("no default YouTube API key configured; the form will require one");
    }

    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_address))?;

    let app = app_router(state);

    info!(
        address = %config.bind_address,
        youtube_api = %config.youtube_api_url,
        "starting HTTP server"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server terminated unexpectedly")?;

    info!("server shutdown complete");

    Ok(())
}

#[allow(clippy::expect_used)] // Startup: panicking is appropriate if signal handlers fail
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
