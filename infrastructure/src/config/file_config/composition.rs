//! Composition configuration from TOML (`[composition]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;
use trio_application::config::{DEFAULT_MAX_DEPTH, ExecutionParams};

/// Limits applied while resolving composite models
///
/// # Example
///
/// ```toml
/// [composition]
/// max_depth = 3
/// call_timeout_seconds = 60
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCompositionConfig {
    /// Maximum nesting of trios/ensembles in one request
    pub max_depth: usize,
    /// Upper bound for a single upstream call, on top of the HTTP timeout
    pub call_timeout_seconds: Option<u64>,
}

impl Default for FileCompositionConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            call_timeout_seconds: None,
        }
    }
}

impl FileCompositionConfig {
    pub fn to_execution_params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_max_depth(self.max_depth)
            .with_call_timeout(self.call_timeout_seconds.map(Duration::from_secs))
    }
}
