//! # Client Binary Entry Point
//!
//! Publishes one typed request to the server and exits.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin client -- --config config/client.toml \
//!   --client-id 1f1679e1-36d2-44b4-a539-2cbbd9c2eca9 \
//!   --request-type AddItem --value apples
//! ```
//!
//! The client will:
//! 1. Load configuration from the specified TOML file
//! 2. Validate the request type and value
//! 3. Connect to the server and publish the request

use anyhow::Context;
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;
use uuid::Uuid;

use item_registry::client::{ClientConfig, Requester, TcpPublisher};
use item_registry::common::config::load_config;
use item_registry::common::messages::{OperationKind, Request};

/// Command-line arguments for the client binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the client configuration file (TOML format)
    ///
    /// Example: config/client.toml
    #[arg(short, long)]
    config: String,

    /// clientID as UUID
    #[arg(long)]
    client_id: Uuid,

    /// Request type: AddItem, RemoveItem, GetItem or GetAllItems
    #[arg(long)]
    request_type: String,

    /// Item value (required unless request type is GetAllItems)
    #[arg(long)]
    value: Option<String>,
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

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logger();

    // Parse command-line arguments
    let args = Args::parse();

    // Validate the operation before anything touches the network
    let kind: OperationKind = args
        .request_type
        .parse()
        .context("parsing request type failed")?;

    let value = args.value.filter(|value| !value.is_empty());
    if kind.requires_value() && value.is_none() {
        anyhow::bail!("item value is required for {} requests", kind);
    }

    // Load client configuration from TOML file
    let config: ClientConfig = load_config(&args.config)?;

    let publisher = TcpPublisher::connect(&config.client.server_address).await?;

    let request = Request {
        client_id: args.client_id,
        value,
        request_type: kind.as_str().to_string(),
    };

    Requester::new(publisher).request(&request).await?;

    Ok(())
}
