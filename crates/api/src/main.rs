//! CalNotify - calendar reminder backend
//!
//! Main entry point for the HTTP server and reminder scheduler.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use calnotify_infra::config;
use calnotify_lib::utils::logging::init_tracing;
use calnotify_lib::{build_router, AppContext};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Local overrides first; dotenvy never replaces variables already set
    let env_files: Vec<_> =
        [".env.local", ".env"].into_iter().filter_map(|name| dotenvy::from_filename(name).ok()).collect();

    init_tracing();

    for path in &env_files {
        info!(path = %path.display(), "Loaded environment file");
    }

    let config = config::load().context("failed to load configuration")?;
    let ctx = Arc::new(AppContext::new(config).context("failed to initialise application")?);

    if ctx.start_scheduler().await.context("failed to start reminder scheduler")? {
        info!(interval_secs = ctx.config.scheduler.interval_seconds, "Reminder scheduler running");
    }

    let host: std::net::IpAddr = ctx
        .config
        .server
        .host
        .parse()
        .with_context(|| format!("invalid listen host: {}", ctx.config.server.host))?;
    let addr = SocketAddr::new(host, ctx.config.server.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "CalNotify listening");

    let app = build_router(Arc::clone(&ctx));
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    ctx.shutdown().await;
    info!("CalNotify stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
