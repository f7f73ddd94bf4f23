//! # TCP Request Intake
//!
//! The shipped [`RequestQueue`] implementation: clients connect over TCP and
//! publish framed JSON requests; every request that decodes is forwarded into
//! one channel consumed by the dispatcher.
//!
//! A payload that fails to decode is logged and skipped; the connection (and
//! the stream) keeps going. When the shutdown token fires the accept loop
//! stops, connection readers wind down, and the listener socket is released.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::common::connection::Connection;
use crate::common::messages::Request;

use super::dispatcher::RequestQueue;

/// How many decoded requests may sit between the intake and the dispatcher
/// before connection readers start waiting.
const CHANNEL_CAPACITY: usize = 100;

/// Request intake over TCP.
pub struct TcpQueue {
    listener: TcpListener,
}

impl TcpQueue {
    /// Bind the intake socket. A bind failure is a startup failure: the
    /// server exits before the dispatcher ever starts.
    pub async fn bind(address: &str) -> Result<Self> {
        let listener = TcpListener::bind(address)
            .await
            .with_context(|| format!("can't bind to {address}"))?;
        Ok(Self { listener })
    }

    /// The address the intake actually listens on (useful with port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }
}

#[async_trait]
impl RequestQueue for TcpQueue {
    async fn requests(self, shutdown: CancellationToken) -> Result<mpsc::Receiver<Request>> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let listener = self.listener;

        tokio::spawn(async move {
            let readers = TaskTracker::new();

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    accepted = listener.accept() => match accepted {
                        Ok((socket, addr)) => {
                            debug!("🔗 Accepted connection from {}", addr);
                            readers.spawn(read_requests(socket, tx.clone(), shutdown.clone()));
                        }
                        Err(e) => error!("❌ Accept error: {}", e),
                    },
                }
            }

            // Dropping the listener releases the socket; readers observe the
            // same token and stop on their own.
            drop(listener);
            readers.close();
            readers.wait().await;
            info!("📡 Request intake stopped");
        });

        Ok(rx)
    }
}

/// Read framed requests from one client connection until it closes or
/// shutdown fires.
async fn read_requests(socket: TcpStream, tx: mpsc::Sender<Request>, shutdown: CancellationToken) {
    let mut conn = Connection::new(socket);

    loop {
        let frame = tokio::select! {
            _ = shutdown.cancelled() => break,
            frame = conn.read_frame() => frame,
        };

        match frame {
            Ok(Some(data)) => match Request::from_bytes(&data) {
                Ok(request) => {
                    if tx.send(request).await.is_err() {
                        break; // dispatcher is gone
                    }
                }
                Err(e) => warn!("⚠️  Dropping undecodable request payload: {}", e),
            },
            Ok(None) => {
                debug!("🔌 Connection closed");
                break;
            }
            Err(e) => {
                error!("❌ Error reading request frame: {}", e);
                break;
            }
        }
    }
}
