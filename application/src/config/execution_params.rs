//! Execution parameters for composed completions.
//!
//! [`ExecutionParams`] groups the static limits applied by
//! [`RunCompletionUseCase`](crate::use_cases::run_completion::RunCompletionUseCase).
//! These are application-layer concerns, not part of a request.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default maximum composite nesting depth
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Limits for composite resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Maximum composite nesting depth (a flat trio or ensemble is depth 1).
    pub max_depth: usize,
    /// Timeout applied to every individual upstream call, if any.
    pub call_timeout: Option<Duration>,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            call_timeout: None,
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_max_depth(mut self, max: usize) -> Self {
        self.max_depth = max;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }
}
