use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use stockfish_session::EngineSession;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Engine is configured once here and never again
    let engine_config = cli.engine_config();
    let session = EngineSession::start(engine_config.clone())
        .await
        .with_context(|| format!("failed to start engine {}", engine_config.path.display()))?;
    let engine = Arc::new(Mutex::new(session));

    let app = backend::router(Arc::clone(&engine), &cli.relay_config());
    let listener = TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("failed to bind {}", cli.bind))?;
    info!("API listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    match Arc::try_unwrap(engine) {
        Ok(session) => session.into_inner().shutdown().await,
        Err(_) => warn!("Engine still in use at shutdown, it will be killed on exit"),
    }
    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
