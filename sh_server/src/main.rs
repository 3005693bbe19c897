//! Shedding card game server using an async actor model.
//!
//! One session actor owns every room; each WebSocket connection talks to it
//! through a cloned handle.

use std::net::SocketAddr;

use anyhow::Error;
use log::{error, info};
use pico_args::Arguments;
use sh_server::{api, config::ServerConfig, logging, metrics};
use shedding::room::SessionActor;

const HELP: &str = "\
Run a shedding card game server

USAGE:
  sh_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --metrics    IP:PORT     Prometheus listener address [default: env METRICS_BIND, disabled if unset]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  METRICS_BIND             Prometheus listener address (e.g., 0.0.0.0:9090)
  ROOM_MAX_PLAYERS         Seats per room (2-5, default 5)
  ROOM_MIN_PLAYERS         Players needed before ready counts (default 2)
  WS_BURST_LIMIT           Frames per second per connection (default 10)
  WS_SUSTAINED_LIMIT       Frames per minute per connection (default 100)
  WS_OUTBOUND_BUFFER       Queued server messages per connection (default 64)
  RUST_LOG                 Log filter (default info)
";

struct Args {
    bind: Option<SocketAddr>,
    metrics: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        metrics: pargs.opt_value_from_str("--metrics")?,
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.metrics)?;
    config.validate()?;
    config
        .rooms
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid room configuration: {}", e))?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus metrics exposed at http://{}/metrics", addr);
    }

    info!(
        "Rooms seat {}-{} players; connections limited to {}/s and {}/min",
        config.rooms.min_players,
        config.rooms.max_players,
        config.limits.burst,
        config.limits.sustained
    );

    let (actor, sessions) = SessionActor::new(config.rooms);
    let actor_task = tokio::spawn(actor.run());

    let app = api::create_router(api::AppState::new(sessions.clone(), config.limits));

    info!("Starting HTTP/WebSocket server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at ws://{}/ws. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");
    if sessions.shutdown().await.is_err() {
        error!("Session actor already stopped");
    }
    let _ = actor_task.await;

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
