//! Presentation layer for trio
//!
//! This crate contains the CLI definition and the OpenAI-compatible HTTP API.

pub mod cli;
pub mod server;

// Re-export commonly used types
pub use cli::Cli;
pub use server::{ApiError, AppState, DETAILS_HEADER, router, serve};
