//! # Serve Subcommand
//!
//! Opens the schema store and serves the HTTP API until Ctrl-C or SIGTERM.
//! A store that fails to load is fatal: the server never starts with a
//! partial registry.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use metrics_exporter_prometheus::PrometheusBuilder;
use schemareg_api::middleware::metrics::{describe_metrics, set_schema_count};
use schemareg_api::{AppConfig, AppState};

/// Arguments for the serve subcommand.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on; keeps the host of the configured bind address.
    #[arg(short, long, env = "SCHEMAREG_PORT")]
    pub port: Option<u16>,

    /// Directory holding the schema files.
    #[arg(short, long, env = "SCHEMAREG_DIR")]
    pub dir: Option<PathBuf>,

    /// YAML configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Serve Prometheus metrics on this address.
    #[arg(long, env = "SCHEMAREG_METRICS_ADDR")]
    pub metrics_addr: Option<SocketAddr>,

    /// Largest accepted request body, in bytes.
    #[arg(long)]
    pub max_body_bytes: Option<usize>,
}

impl ServeArgs {
    /// Defaults, then the config file, then env/flags.
    pub fn resolve_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_yaml_file(path)?,
            None => AppConfig::default(),
        };
        if let Some(port) = self.port {
            config.bind.set_port(port);
        }
        if let Some(dir) = &self.dir {
            config.schema_dir = dir.clone();
        }
        if let Some(addr) = self.metrics_addr {
            config.metrics_bind = Some(addr);
        }
        if let Some(limit) = self.max_body_bytes {
            config.max_body_bytes = limit;
        }
        Ok(config)
    }
}

pub fn run_serve(args: &ServeArgs) -> anyhow::Result<u8> {
    let config = args.resolve_config()?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;
    runtime.block_on(serve(config))?;
    Ok(0)
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    if let Some(addr) = config.metrics_bind {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .with_context(|| format!("failed to start metrics exporter on {addr}"))?;
        describe_metrics();
        tracing::info!(%addr, "metrics exporter listening");
    }

    let bind = config.bind;
    let schema_dir = config.schema_dir.clone();
    let state = tokio::task::spawn_blocking(move || AppState::open(config))
        .await
        .context("store loader panicked")?
        .with_context(|| format!("failed to load schemas from {}", schema_dir.display()))?;
    set_schema_count(state.store.len());
    tracing::info!(
        dir = %schema_dir.display(),
        schemas = state.store.len(),
        "schema store ready"
    );

    let app = schemareg_api::app(state);
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    tracing::info!(addr = %bind, "schemareg listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received, draining connections");
}
