use anyhow::Context;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use clue_core::{WordBank, WordProvider};
use clue_server::{
    config::Config, create_routes, game_manager::GameManager, websocket::ConnectionManager,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    info!("Starting Clue Rush server...");

    let config = Config::from_env().context("Invalid configuration")?;

    let words: Arc<dyn WordProvider> = match &config.words_file {
        Some(path) => Arc::new(WordBank::from_file(path)?),
        None => {
            let bank = WordBank::builtin();
            info!("Using built-in word list ({} words)", bank.len());
            Arc::new(bank)
        }
    };

    let connection_manager = Arc::new(ConnectionManager::new());
    let game_manager = GameManager::start(words, connection_manager.clone());
    let socket_addr = config.socket_addr();
    let routes = create_routes(connection_manager, game_manager, config);

    info!("Server starting on {}", socket_addr);

    let (addr, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(socket_addr, shutdown_signal())
        .with_context(|| format!("Failed to bind {}", socket_addr))?;

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM (Ctrl+C elsewhere).
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                tokio::select! {
                    _ = sigint.recv() => {
                        info!("Received SIGINT, shutting down gracefully...");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down gracefully...");
                    }
                }
                return;
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!("Failed to install signal handlers, falling back to Ctrl+C: {}", e);
            }
        }
    }

    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        // Never resolve rather than shut down immediately
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down gracefully...");
}
