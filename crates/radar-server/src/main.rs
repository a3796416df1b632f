//! invest-radar HTTP server
//!
//! # Usage
//!
//! ```bash
//! export GEMINI_API_KEY=...
//! export ALPHA_VANTAGE_API_KEY=...
//! cargo run --bin radar-server -- --bind 0.0.0.0:8888
//! ```

use anyhow::Context;
use clap::Parser;
use radar_server::{AppState, Language, ServerConfig, create_router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "radar-server")]
#[command(about = "Stock lookup and streamed AI analysis server", long_about = None)]
#[command(version)]
struct Args {
    /// Listen address, overrides RADAR_BIND
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Generation model, overrides GEMINI_MODEL
    #[arg(short, long)]
    model: Option<String>,

    /// Prompt language (en, no), overrides RADAR_LANGUAGE
    #[arg(short, long)]
    language: Option<Language>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    radar_utils::init_tracing();

    let args = Args::parse();

    let mut config = ServerConfig::from_env();
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(model) = args.model {
        config.model = model;
    }
    if let Some(language) = args.language {
        config.language = language;
    }

    let state = AppState::from_config(&config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    info!(addr = %config.bind, model = %config.model, language = %config.language, "radar-server listening");
    info!("Endpoints:");
    info!("  GET  /health");
    info!("  GET  /api/stock?ticker=TICKER");
    info!("  POST /api/analyze");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("radar-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, initiating shutdown"),
        () = terminate => info!("Received SIGTERM, initiating shutdown"),
    }
}
