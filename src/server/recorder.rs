//! # Audit Recorder
//!
//! Writes one human-readable line per processed operation, reflecting the
//! client's post-operation state.
//!
//! Handlers call [`Recorder::record`] while still holding the store lock for
//! the operation, so a recorded state is never one the set only passed
//! through transiently because of a concurrent operation, and lines appear in
//! the same order the states occurred.

use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::common::messages::OperationKind;

/// Audit line writer over any async byte sink.
///
/// The server wires a `tokio::fs::File`; tests wire a temp file.
pub struct Recorder {
    writer: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
}

impl Recorder {
    pub fn new(writer: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Append the audit line for one processed operation.
    ///
    /// Two line shapes exist:
    /// - with value: `clientID: '<id>', request type: '<kind>', item value: '<value>', current state: '<state>'`
    /// - without value: `clientID: '<id>', request type: '<kind>', current state: '<state>'`
    ///
    /// `state` is the client's set in insertion order, rendered like
    /// `["x", "y"]`.
    pub async fn record(
        &self,
        client_id: Uuid,
        kind: OperationKind,
        value: Option<&str>,
        state: &[&str],
    ) -> io::Result<()> {
        let line = match value {
            Some(value) => format!(
                "clientID: '{}', request type: '{}', item value: '{}', current state: '{:?}'\n",
                client_id, kind, value, state
            ),
            None => format!(
                "clientID: '{}', request type: '{}', current state: '{:?}'\n",
                client_id, kind, state
            ),
        };

        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await
    }
}
