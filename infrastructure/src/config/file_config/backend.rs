//! Backend configuration from TOML (`[backend]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The OpenAI-compatible service every named model is sent to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    /// Base URL, without the `/v1/chat/completions` suffix
    pub url: String,
    /// Sent as a bearer token when set
    pub api_key: Option<String>,
    /// Per-request HTTP timeout
    pub timeout_seconds: u64,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            url: "http://litellm:4000".to_string(),
            api_key: None,
            timeout_seconds: 120,
        }
    }
}

impl FileBackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
