//! OpenAI-style error responses

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use trio_application::RunCompletionError;
use trio_domain::DomainError;

/// Error returned by an API handler
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub kind: &'static str,
    pub param: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    message: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    param: Option<&'a str>,
}

impl ApiError {
    pub fn invalid_request(message: impl Into<String>, param: Option<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            kind: "invalid_request_error",
            param,
        }
    }

    pub fn streaming_unsupported() -> Self {
        Self {
            status: StatusCode::NOT_IMPLEMENTED,
            message: "Streaming is not supported".to_string(),
            kind: "invalid_request_error",
            param: Some("stream".to_string()),
        }
    }

    fn upstream(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            message: message.to_string(),
            kind: "upstream_error",
            param: None,
        }
    }
}

/// Request faults keep their detail; upstream detail stays in the logs.
impl From<RunCompletionError> for ApiError {
    fn from(error: RunCompletionError) -> Self {
        match &error {
            RunCompletionError::Domain(DomainError::Validation { field, .. }) => {
                Self::invalid_request(error.to_string(), Some(field.clone()))
            }
            RunCompletionError::Domain(DomainError::CompositionTooDeep { .. }) => {
                Self::invalid_request(error.to_string(), Some("model".to_string()))
            }
            RunCompletionError::Domain(DomainError::AllMembersFailed(_)) => Self::upstream(
                StatusCode::BAD_GATEWAY,
                "All composed models failed to respond",
            ),
            _ if error.is_timeout() => Self::upstream(
                StatusCode::GATEWAY_TIMEOUT,
                "The backend model did not respond in time",
            ),
            RunCompletionError::Completion(_) => {
                Self::upstream(StatusCode::BAD_GATEWAY, "The backend model request failed")
            }
        }
    }
}

/// Body extraction failures keep the extractor's status and message
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
            kind: "invalid_request_error",
            param: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                message: &self.message,
                kind: self.kind,
                param: self.param.as_deref(),
            },
        };
        (self.status, Json(body)).into_response()
    }
}
