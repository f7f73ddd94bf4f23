//! # Request Publishing
//!
//! Serializes one [`Request`] and hands it to a [`Publisher`]. The publisher
//! only ever sees opaque bytes; the TCP implementation frames them onto the
//! server's intake socket.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;

use crate::common::connection::Connection;
use crate::common::messages::Request;

/// Client configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub client: ClientInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Address of the server's request intake (e.g., "127.0.0.1:8100")
    pub server_address: String,
}

/// Minimal delivery interface: publish one serialized payload to the
/// destination.
#[async_trait]
pub trait Publisher {
    async fn publish(&mut self, bytes: Vec<u8>) -> Result<()>;
}

/// Publishes payloads to the server over a framed TCP connection.
pub struct TcpPublisher {
    conn: Connection,
}

impl TcpPublisher {
    pub async fn connect(address: &str) -> Result<Self> {
        let stream = TcpStream::connect(address)
            .await
            .with_context(|| format!("can't connect to {address}"))?;
        Ok(Self {
            conn: Connection::new(stream),
        })
    }
}

#[async_trait]
impl Publisher for TcpPublisher {
    async fn publish(&mut self, bytes: Vec<u8>) -> Result<()> {
        self.conn.write_frame(&bytes).await
    }
}

/// Serializes requests and hands them to a publisher.
pub struct Requester<P> {
    publisher: P,
}

impl<P: Publisher> Requester<P> {
    pub fn new(publisher: P) -> Self {
        Self { publisher }
    }

    /// Publish one request.
    pub async fn request(&mut self, request: &Request) -> Result<()> {
        let bytes = request.to_bytes().context("marshaling request failed")?;
        self.publisher
            .publish(bytes)
            .await
            .context("publishing request failed")?;

        info!(
            "✅ Published {} request for client {}",
            request.request_type, request.client_id
        );
        Ok(())
    }
}
