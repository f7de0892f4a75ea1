//! Server configuration from TOML (`[server]` section)

use serde::{Deserialize, Serialize};

/// Listen address of the HTTP endpoint
///
/// # Example
///
/// ```toml
/// [server]
/// host = "127.0.0.1"
/// port = 8080
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl FileServerConfig {
    /// `host:port` as passed to the TCP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
