//! Shared-room blackjack server using the async actor model.
//!
//! Spawns the initial rooms through a RoomManager and serves the
//! HTTP/WebSocket API on top of an in-memory account service.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use blackjack_table::{RoomManager, accounts::InMemoryAccounts};
use bt_server::{api, config::ServerConfig, logging};
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Run a shared-room blackjack server

USAGE:
  bt_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --rooms      N           Number of rooms to create   [default: env INITIAL_ROOMS or 1]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  INITIAL_ROOMS            Rooms created on startup
  DEFAULT_BALANCE          Chips granted to every new user
  ROOM_*                   Room pacing, e.g. ROOM_BETTING_TURN_SECS, ROOM_RESTART_DELAY_SECS
  RUST_LOG                 Log filter [default: info]
";

struct Args {
    bind: Option<SocketAddr>,
    rooms: Option<usize>,
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
        rooms: pargs.opt_value_from_str("--rooms")?,
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.rooms)?;
    info!("Starting blackjack server at {}", config.bind);

    let accounts = Arc::new(InMemoryAccounts::new(config.default_balance));
    let room_manager = Arc::new(RoomManager::new(accounts.clone(), config.room.clone()));

    info!("Creating {} initial room(s)...", config.initial_rooms);
    // The first room becomes the main room new users are pointed at
    let main_room = room_manager.main_room().await?;
    info!("Main room is {}", main_room);
    for _ in 1..config.initial_rooms {
        match room_manager.create_room().await {
            Ok(room_id) => info!("Created room {}", room_id),
            Err(e) => log::error!("Failed to create room: {}", e),
        }
    }

    info!(
        "Server ready with {} active room(s)",
        room_manager.active_room_count().await
    );

    let app = api::create_router(api::AppState {
        room_manager,
        accounts,
    });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
}
