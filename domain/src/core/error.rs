//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Structurally invalid request, scoped to the offending field path
    /// (e.g. `model.ensemble[1].model`).
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Composition nesting exceeds the maximum depth of {max_depth}")]
    CompositionTooDeep { max_depth: usize },

    #[error("All members failed to respond: {0}")]
    AllMembersFailed(String),
}

impl DomainError {
    /// Create a validation error for the given field path
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Field path of a validation error, if this is one
    pub fn field(&self) -> Option<&str> {
        match self {
            DomainError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Whether the error was caused by the request itself rather than upstream models
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DomainError::Validation { .. } | DomainError::CompositionTooDeep { .. }
        )
    }
}
