//! # TCP Connection Abstraction
//!
//! Provides a wrapper around TCP streams with frame-level message framing.
//!
//! ## Wire Protocol
//!
//! Frames are sent with a 4-byte length prefix (big-endian) followed by the
//! JSON payload:
//! ```text
//! [4 bytes: payload length] [N bytes: JSON payload]
//! ```
//!
//! This length-prefixed protocol allows for:
//! - Reliable message boundaries over TCP streams
//! - Protection against incomplete reads
//!
//! Decoding the payload is deliberately left to the caller: the server keeps
//! reading from a connection even when one payload turns out to be garbage.

use anyhow::Result;
use log::error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Maximum allowed frame size (1MB). Requests are tiny; anything bigger is a
/// corrupt length prefix or a misbehaving peer.
const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// TCP connection wrapper with frame framing support.
///
/// Handles length-prefixed framing of raw payloads over a TCP stream.
pub struct Connection {
    /// Underlying TCP stream
    stream: TcpStream,
}

impl Connection {
    /// Create a new Connection from an existing TCP stream.
    pub fn new(stream: TcpStream) -> Self {
        Self { stream }
    }

    /// Read one frame from the connection.
    ///
    /// # Returns
    /// - `Ok(Some(bytes))`: Successfully read a complete frame payload
    /// - `Ok(None)`: Connection closed cleanly or frame rejected as oversized
    /// - `Err`: I/O error occurred mid-frame
    pub async fn read_frame(&mut self) -> Result<Option<Vec<u8>>> {
        // First, read the 4-byte length prefix that tells us the payload size
        let mut length_buf = [0u8; 4];

        match self.stream.read_exact(&mut length_buf).await {
            Ok(_) => {
                let length = u32::from_be_bytes(length_buf) as usize;

                // Sanity check: reject frames larger than MAX_FRAME_SIZE
                if length > MAX_FRAME_SIZE {
                    error!(
                        "❌ Frame too large: {} bytes (max: {} bytes)",
                        length, MAX_FRAME_SIZE
                    );
                    return Ok(None);
                }

                // Now read the actual payload
                let mut data = vec![0u8; length];
                self.stream.read_exact(&mut data).await?;

                Ok(Some(data))
            }
            Err(_) => Ok(None), // Connection closed cleanly
        }
    }

    /// Write one frame to the connection.
    ///
    /// # Protocol
    /// 1. Writes 4-byte length prefix (big-endian u32)
    /// 2. Writes the payload
    /// 3. Flushes the stream to ensure delivery
    pub async fn write_frame(&mut self, data: &[u8]) -> Result<()> {
        let length = data.len() as u32;

        // Send: [4 bytes length][payload]
        self.stream.write_all(&length.to_be_bytes()).await?;
        self.stream.write_all(data).await?;
        self.stream.flush().await?;

        Ok(())
    }
}
