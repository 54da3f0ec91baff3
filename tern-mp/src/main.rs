//! Media Player (tern-mp) - Main entry point
//!
//! Runs the unified playback coordinator for the Tern feed reader as a
//! local service: REST commands and resource callbacks in, session
//! snapshots and SSE streams out.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tern_common::config::PlayerConfig;
use tern_mp::api;
use tern_mp::bootstrap;

/// Command-line arguments for tern-mp
#[derive(Parser, Debug)]
#[command(name = "tern-mp")]
#[command(about = "Media player service for the Tern feed reader")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "TERN_MP_PORT")]
    port: Option<u16>,

    /// Path to a player.toml config file
    #[arg(short, long, env = "TERN_MP_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tern_mp=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments
    let args = Args::parse();

    let config = PlayerConfig::resolve(args.config.as_deref(), args.port)
        .context("Failed to load configuration")?;
    info!("Starting Tern media player on port {}", config.port);

    // Construct and wire the playback engines
    let players = bootstrap::wire(&config);
    info!("Playback engines wired");

    // Build the application router
    let app_state = api::AppState {
        players,
        port: config.port,
    };
    let app = api::create_router(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid listen address")?;
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
