//! # Message Protocol
//!
//! Defines the request payload clients publish and the server consumes.
//!
//! Requests are serialized to JSON and sent over TCP with a 4-byte length
//! prefix. The wire field names (`clientID`, `value`, `requestType`) are part
//! of the protocol and must not change. `requestType` travels as a plain
//! string so the server can reject unknown kinds at dispatch time with a
//! warning instead of failing the whole decode.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// A single typed operation submitted by a client against its value set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Unique identifier of the requesting client
    #[serde(rename = "clientID")]
    pub client_id: Uuid,

    /// Item value; required for AddItem/RemoveItem/GetItem, absent for GetAllItems
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Operation name, one of the literals in [`OperationKind`]
    #[serde(rename = "requestType")]
    pub request_type: String,
}

impl Request {
    /// Serialize the request to JSON bytes for transmission over the network.
    pub fn to_bytes(&self) -> anyhow::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize a request from JSON bytes received from the network.
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// The four operations the server knows how to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Insert a value into the client's set (idempotent)
    Add,
    /// Delete a value from the client's set
    Remove,
    /// Test membership without mutating
    Check,
    /// Enumerate the client's set in insertion order
    ListAll,
}

/// Error returned when a request names an operation the server does not know.
#[derive(Debug, Clone, Error)]
#[error("request type '{0}' is not supported")]
pub struct UnsupportedOperation(pub String);

impl OperationKind {
    pub const ALL: [OperationKind; 4] = [
        OperationKind::Add,
        OperationKind::Remove,
        OperationKind::Check,
        OperationKind::ListAll,
    ];

    /// The wire literal for this operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Add => "AddItem",
            OperationKind::Remove => "RemoveItem",
            OperationKind::Check => "GetItem",
            OperationKind::ListAll => "GetAllItems",
        }
    }

    /// Whether a request of this kind must carry an item value.
    pub fn requires_value(&self) -> bool {
        !matches!(self, OperationKind::ListAll)
    }
}

impl FromStr for OperationKind {
    type Err = UnsupportedOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AddItem" => Ok(OperationKind::Add),
            "RemoveItem" => Ok(OperationKind::Remove),
            "GetItem" => Ok(OperationKind::Check),
            "GetAllItems" => Ok(OperationKind::ListAll),
            other => Err(UnsupportedOperation(other.to_string())),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
