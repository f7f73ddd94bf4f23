//! # Server Binary Entry Point
//!
//! Thin wrapper that wires the request intake, dispatcher, store and audit
//! recorder together.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin server -- --config config/server.toml
//! ```
//!
//! The server will:
//! 1. Load configuration from the specified TOML file
//! 2. Bind the TCP request intake
//! 3. Create the audit log file
//! 4. Process requests until Ctrl+C or SIGTERM, then drain in-flight work

use clap::Parser;
use env_logger::Builder;
use log::{info, LevelFilter};
use std::io::Write;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use item_registry::common::config::load_config;
use item_registry::server::{
    ClientStore, Dispatcher, Recorder, ServerConfig, StoreService, TcpQueue,
};

/// Command-line arguments for the server binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the server configuration file (TOML format)
    ///
    /// Example: config/server.toml
    #[arg(short, long)]
    config: String,
}

/// Initialize the logging system with timestamp, level, and message formatting.
///
/// Logs are printed to stdout with INFO level by default.
/// Format: `[HH:MM:SS] [LEVEL] message`
fn init_logger() {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(LevelFilter::Info)
        .init();
}

/// Cancel the token on Ctrl+C or SIGTERM.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("🛑 Received Ctrl+C, shutting down..."),
        _ = terminate => info!("🛑 Received SIGTERM, shutting down..."),
    }

    shutdown.cancel();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logger();

    // Parse command-line arguments
    let args = Args::parse();

    // Load server configuration from TOML file
    let config: ServerConfig = load_config(&args.config)?;

    // Bind the request intake and create the audit log; both are fatal if
    // they fail, nothing has started yet.
    let queue = TcpQueue::bind(&config.server.address).await?;
    let audit_file = tokio::fs::File::create(&config.server.audit_log).await?;

    // The store is constructed here and injected, not a global.
    let store = Arc::new(ClientStore::new());
    let service = Arc::new(StoreService::new(store, Recorder::new(audit_file)));

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    info!("🚀 Server listening on {}", config.server.address);

    Dispatcher::new(service).run(queue, shutdown).await?;

    info!("✅ Server stopped");
    Ok(())
}
