//! Trace synchronization daemon
//!
//! Runs the discovery, payload sync and export loops against a shared
//! SQLite store until interrupted.

use anyhow::Context;
use core_service::{logging, ServiceConfig, TraceService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init_logging();

    let config = ServiceConfig::from_env().context("loading configuration")?;
    let service = TraceService::start(config)
        .await
        .context("starting service")?;

    tokio::signal::ctrl_c()
        .await
        .context("listening for shutdown signal")?;
    tracing::info!("Shutdown signal received");

    service.shutdown().await;
    Ok(())
}
