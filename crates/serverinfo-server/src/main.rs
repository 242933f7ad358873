//! serverinfo server
//!
//! - `/` info page with echo form
//! - `/health`, `/readyz`, `/metrics`, `/api/info`
//! - Request counters and latency histograms for every route
//! - Graceful shutdown on Ctrl-C / SIGTERM

use std::net::SocketAddr;

use serverinfo_core::error::{Result, ServerInfoError};
use tracing_subscriber::{fmt, EnvFilter};

use serverinfo_server::{app_state::AppState, config, host::HostIdentity, router};

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, code = e.code().as_str(), "serverinfo failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::var(config::CONFIG_PATH_ENV)
        .unwrap_or_else(|_| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::load(&path)?;
    let listen = cfg.server.listen_addr()?;

    let host = HostIdentity::resolve().await;
    tracing::info!(
        hostname = %host.hostname,
        ip = %host.ip_address,
        version = %cfg.app.version,
        environment = %cfg.app.environment,
        build = %cfg.app.build_number,
        "host identity resolved"
    );

    let state = AppState::new(cfg, host)?;
    let app = router::build_router(state.clone());

    tracing::info!(%listen, "serverinfo starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| ServerInfoError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(state))
    .await
    .map_err(|e| ServerInfoError::Internal(format!("server failed: {e}")))?;

    tracing::info!("serverinfo stopped");
    Ok(())
}

async fn shutdown_signal(state: AppState) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
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

    state.set_draining();
    tracing::info!("shutdown signal received, draining");
}
