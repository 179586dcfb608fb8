//! Reversi server (default binary).
//!
//! Reads `REVERSI_*` settings from the environment, checks the port is free,
//! then serves one game session per TCP connection until interrupted.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reversi_net::server::{check_tcp_listen_available, run_server, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("reversi_net=info,reversi_net_server=info")
        }))
        .init();

    let config = ServerConfig::from_env();
    check_tcp_listen_available(&config.host, config.port)
        .with_context(|| format!("cannot listen on {}:{}", config.host, config.port))?;

    tracing::info!(host = %config.host, port = config.port, "server starting");

    tokio::select! {
        result = run_server(config, None) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }

    Ok(())
}
