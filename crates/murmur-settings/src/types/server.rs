//! Server network settings.

use serde::{Deserialize, Serialize};

/// Smallest accepted WebSocket message limit.
pub const MIN_MESSAGE_BYTES: usize = 1024;
/// Largest accepted WebSocket message limit.
pub const MAX_MESSAGE_BYTES: usize = 64 * 1024 * 1024;

/// Bind address and transport limits.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port (`0` picks a free port).
    pub port: u16,
    /// Largest single WebSocket message accepted, in bytes.
    pub max_message_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 2700,
            max_message_bytes: 8 * 1024 * 1024,
        }
    }
}
