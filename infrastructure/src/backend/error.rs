//! Error types for the backend adapter

use thiserror::Error;

/// Errors raised while setting up the backend client
///
/// Failures of individual calls are reported as
/// [`CompletionError`](trio_application::CompletionError) instead.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
