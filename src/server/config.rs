use serde::{Deserialize, Serialize};

/// Complete server configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub server: ServerInfo,
}

/// Information about this server instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Network address where the request intake listens (e.g., "127.0.0.1:8100")
    pub address: String,
    /// Path of the audit log file, recreated on every start
    pub audit_log: String,
}
