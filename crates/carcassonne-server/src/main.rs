//! Carcassonne multiplayer game server.

use anyhow::Context;
use carcassonne_core::GameConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod protocol;
mod room;
mod server;

use server::ServerState;

/// Settings read from the environment at startup.
#[derive(Debug, Clone, Copy)]
struct ServerConfig {
    addr: SocketAddr,
    game: GameConfig,
}

impl ServerConfig {
    fn from_env() -> anyhow::Result<Self> {
        let addr = std::env::var("SERVER_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:4001".into())
            .parse()
            .context("SERVER_ADDR must be a socket address")?;

        let rivers = match std::env::var("RIVERS") {
            Ok(value) => value
                .parse()
                .context("RIVERS must be true or false")?,
            Err(_) => GameConfig::default().rivers,
        };

        Ok(Self {
            addr,
            game: GameConfig { rivers },
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    info!(
        "Starting Carcassonne server (rivers: {})...",
        config.game.rivers
    );

    let state = Arc::new(ServerState::new(config.game));

    server::run_server(config.addr, state).await
}
