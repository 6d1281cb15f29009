//! Server entry point: config, tracing, database, router, graceful shutdown.

use std::net::{Ipv4Addr, SocketAddr};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use snack_api::backup::auto_backup_task;
use snack_api::config::ApiConfig;
use snack_api::build;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ApiConfig::from_env()?;
    if config.database_path.is_none() {
        warn!("DATABASE_PATH not set, running on in-memory storage (data is not persistent)");
    }

    let (router, ctx) = build(&config).await?;

    if let (Some(dir), Some(interval)) = (&config.backup_dir, config.backup_interval) {
        info!(dir = %dir.display(), ?interval, "auto-backup enabled");
        tokio::spawn(auto_backup_task(ctx.db.clone(), dir.clone(), interval));
    }

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, mode = ctx.mode, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to install shutdown handler");
    }
}
