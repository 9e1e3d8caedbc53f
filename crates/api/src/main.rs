//! Slotwise - appointment scheduling backend
//!
//! Server binary entry point.

use std::sync::Arc;

use slotwise_api::{router, AppContext};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env file found"),
    }

    let config = slotwise_infra::config::load()?;
    let bind_addr = config.server.bind_addr.clone();

    let ctx = Arc::new(AppContext::new(config)?);

    let (mut reminder_scheduler, mut mirror_scheduler) = ctx.build_schedulers();
    reminder_scheduler.start().await?;
    mirror_scheduler.start().await?;

    let app = router(Arc::clone(&ctx));
    let listener = TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "slotwise listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    if let Err(err) = reminder_scheduler.stop().await {
        warn!(error = %err, "reminder scheduler did not stop cleanly");
    }
    if let Err(err) = mirror_scheduler.stop().await {
        warn!(error = %err, "mirror scheduler did not stop cleanly");
    }

    info!("slotwise stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
    }
}
