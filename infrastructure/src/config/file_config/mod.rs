//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Every section is `#[serde(default)]`, so a partial file is valid.

mod backend;
mod composition;
mod logging;
mod server;

pub use backend::FileBackendConfig;
pub use composition::FileCompositionConfig;
pub use logging::FileLoggingConfig;
pub use server::FileServerConfig;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// HTTP listen address
    pub server: FileServerConfig,
    /// Upstream completion service
    pub backend: FileBackendConfig,
    /// Composite resolution limits
    pub composition: FileCompositionConfig,
    /// JSONL trace log
    pub logging: FileLoggingConfig,
}

/// How serious a configuration issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Startup continues
    Warning,
    /// Startup must abort
    Error,
}

/// A single problem found by [`FileConfig::validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    /// Dotted path of the offending key, e.g. `server.port`
    pub field: &'static str,
    pub message: String,
}

impl ConfigIssue {
    fn error(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field,
            message: message.into(),
        }
    }

    fn warning(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let url = self.backend.url.trim();
        if url.is_empty() {
            issues.push(ConfigIssue::error("backend.url", "cannot be empty"));
        } else if !(url.starts_with("http://") || url.starts_with("https://")) {
            issues.push(ConfigIssue::error(
                "backend.url",
                format!("'{}' must start with http:// or https://", url),
            ));
        }

        if self.backend.timeout_seconds == 0 {
            issues.push(ConfigIssue::error("backend.timeout_seconds", "cannot be 0"));
        }

        if self.server.port == 0 {
            issues.push(ConfigIssue::error("server.port", "cannot be 0"));
        }

        if self.composition.max_depth == 0 {
            issues.push(ConfigIssue::error(
                "composition.max_depth",
                "must be at least 1, otherwise no composite can run",
            ));
        }

        match self.composition.call_timeout_seconds {
            Some(0) => issues.push(ConfigIssue::error(
                "composition.call_timeout_seconds",
                "cannot be 0",
            )),
            Some(secs) if secs > self.backend.timeout_seconds => {
                issues.push(ConfigIssue::warning(
                    "composition.call_timeout_seconds",
                    format!(
                        "{}s exceeds backend.timeout_seconds ({}s) and will never trigger",
                        secs, self.backend.timeout_seconds
                    ),
                ))
            }
            _ => {}
        }

        issues
    }
}
