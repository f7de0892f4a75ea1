//! Application-level configuration.
//!
//! - [`ExecutionParams`] - composite depth limit and per-call timeout

pub mod execution_params;

pub use execution_params::{DEFAULT_MAX_DEPTH, ExecutionParams};
