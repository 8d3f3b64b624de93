mod api;
mod middleware;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use storefind_core::AppConfig;
use storefind_index::{read_store_csv, MemoryIndex};
use storefind_locator::StoreLocator;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, default_rate_limit_state, AppState};

#[derive(Debug, Parser)]
#[command(name = "storefind-server")]
#[command(about = "HTTP API for nearest-store lookups")]
struct Args {
    /// Serve from an in-process index loaded from this CSV export instead of
    /// the configured search backend
    #[arg(long)]
    memory_csv: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = storefind_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let locator = match &args.memory_csv {
        Some(path) => memory_locator(&config, path)?,
        None => StoreLocator::from_config(&config)?,
    };

    let state = AppState {
        locator,
        default_unit: config.default_unit,
    };
    let app = build_app(
        state,
        default_rate_limit_state(),
        Duration::from_secs(config.request_timeout_secs),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "storefind server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Builds a locator over a [`MemoryIndex`] seeded from `path`, still
/// geocoding through the configured provider.
fn memory_locator(config: &AppConfig, path: &Path) -> anyhow::Result<StoreLocator> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let report = read_store_csv(file)?;
    let index = MemoryIndex::from_records(report.records)?;
    tracing::info!(
        stores = index.len(),
        skipped = report.skipped,
        "serving from in-memory index"
    );
    Ok(StoreLocator::from_config_with_index(Arc::new(index), config)?)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
