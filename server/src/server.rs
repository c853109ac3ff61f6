//! Server setup and lifecycle.

use config::Config;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use crate::error::{ApiError, Result};
use crate::routes::create_router;
use crate::state::AppState;

pub struct RecapServer {
    state: Arc<AppState>
}

impl RecapServer {
    pub fn new(config: Config, metrics: Option<PrometheusHandle>) -> Result<Self> {
        Ok(Self::with_state(Arc::new(AppState::new(config, metrics)?)))
    }

    pub fn with_state(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Blocks until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        let server = &self.state.config.server;
        let addr: SocketAddr = format!("{}:{}", server.host, server.port)
            .parse()
            .map_err(|e| ApiError::Configuration(format!("Invalid address: {e}")))?;

        let router = create_router(self.state.clone());

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ApiError::Server(format!("Failed to bind to {addr}: {e}")))?;

        tracing::info!(%addr, "Recap server starting");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ApiError::Server(format!("Server error: {e}")))?;

        tracing::info!("Recap server stopped");
        Ok(())
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        () = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn install_metrics(config: &Config) -> Result<Option<PrometheusHandle>> {
    if !config.observability.metrics_enabled {
        return Ok(None);
    }
    PrometheusBuilder::new()
        .install_recorder()
        .map(Some)
        .map_err(|e| ApiError::Configuration(format!("Metrics recorder: {e}")))
}

/// Entry point for containerized deployments: `.env`, then `RECAP_CONFIG`
/// (TOML or YAML) if set, then the process environment.
pub async fn run_from_env() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config_path = std::env::var_os("RECAP_CONFIG").map(PathBuf::from);
    let config = config::load_layered(config_path.as_deref(), None)?;

    init_tracing(&config.observability.logging_level);
    let metrics = install_metrics(&config)?;

    RecapServer::new(config, metrics)?.run().await?;
    Ok(())
}
