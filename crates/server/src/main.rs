pub mod db;
pub mod notifications;
pub mod server;
pub mod services;
pub mod version;
pub mod web;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use dotenv::dotenv;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::db::store::{seed, Store};
use crate::notifications::encryption::EncryptionService;
use crate::server::config::ServerConfig;
use crate::server::dispatcher::ExecutionDispatcher;
use crate::server::result_broadcaster::{ResultBroadcaster, UpdateMsg};
use crate::server::runner::SimulatedRunner;
use crate::services::ai_service::AiClient;
use crate::version::VERSION;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,
}

fn init_logging(log_dir: &str) {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(log_dir, "server.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false) // No ANSI colors in file
        .json(); // Log as JSON

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    // Combine layers and filter based on RUST_LOG
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Manually check for --version before full parsing to keep the original simple output.
    if std::env::args().any(|arg| arg == "--version") {
        println!("Server version: {VERSION}");
        return Ok(());
    }

    let args = Args::parse();
    dotenv().ok(); // Load .env file

    // --- Server Config Setup ---
    let server_config = match ServerConfig::load(args.config.as_deref()) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load server configuration: {e}");
            return Err(e.into());
        }
    };

    init_logging(&server_config.log_dir);
    info!("Starting server, version: {}", VERSION);

    // --- Settings Encryption Setup ---
    let key_bytes = hex::decode(&server_config.settings_encryption_key)
        .map_err(|e| format!("SETTINGS_ENCRYPTION_KEY must be hex: {e}"))?;
    let encryption_service = Arc::new(
        EncryptionService::new(&key_bytes)
            .map_err(|e| format!("Failed to create encryption service: {e}"))?,
    );

    // --- In-Memory Store Setup ---
    let store = Store::new();
    if server_config.seed_demo_data {
        let mut guard = store.write().await;
        seed::seed_demo_data(&mut guard);
        info!(
            computers = guard.computers.len(),
            groups = guard.groups.len(),
            procedures = guard.procedures.len(),
            "Seeded demo fleet into the in-memory store."
        );
    }

    // --- Update Broadcast Channel ---
    let (updates_tx, _rx) = broadcast::channel::<UpdateMsg>(100);
    let result_broadcaster = Arc::new(ResultBroadcaster::new(updates_tx));

    // --- Execution Dispatcher Setup ---
    // The simulated runner stands in for real agents; swap it out behind
    // the ExecutionRunner trait when a transport exists.
    let dispatcher = ExecutionDispatcher::new(
        store.clone(),
        Arc::new(SimulatedRunner),
        result_broadcaster.clone(),
    );

    let ai_client = AiClient::new();

    // --- Axum HTTP Server Setup ---
    let http_router = web::create_axum_router(
        store,
        dispatcher,
        ai_client,
        encryption_service,
        result_broadcaster,
        server_config.clone(),
    );

    let addr: SocketAddr = server_config.listen_addr.parse().map_err(|e| {
        error!(listen_addr = %server_config.listen_addr, "Invalid listen address.");
        format!("Invalid listen address '{}': {e}", server_config.listen_addr)
    })?;

    let socket = if addr.is_ipv4() {
        tokio::net::TcpSocket::new_v4()?
    } else {
        tokio::net::TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.set_keepalive(true)?;
    socket.bind(addr)?;
    let listener = socket.listen(1024)?;
    info!(address = %addr, "HTTP server listening with TCP Keepalive");

    axum::serve(listener, http_router.into_make_service())
        .await
        .map_err(Box::new)?;

    Ok(())
}
