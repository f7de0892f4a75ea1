//! Route handlers

use super::AppState;
use super::dto::ChatCompletionRequest;
use super::error::ApiError;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use tracing::{info, warn};
use trio_application::CompletionClient;
use trio_domain::ModelList;

/// Header carrying the JSON trace of a composite completion
pub const DETAILS_HEADER: &str = "x-trio-details";

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn list_models() -> Json<ModelList> {
    Json(ModelList::composite())
}

pub async fn chat_completions<C: CompletionClient + 'static>(
    State(state): State<AppState<C>>,
    payload: Result<Json<ChatCompletionRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.inspect_err(|e| warn!("Rejected request body: {}", e))?;
    if request.stream {
        return Err(ApiError::streaming_unsupported());
    }

    let composite = request.model.is_composite();
    let output = state
        .use_case
        .execute(request.into_input())
        .await
        .inspect_err(|e| warn!("Completion failed: {}", e))?;

    let mut headers = HeaderMap::new();
    if let Some(details) = &output.details {
        match details
            .to_header_value()
            .map(|value| HeaderValue::from_str(&value))
        {
            Ok(Ok(value)) => {
                headers.insert(DETAILS_HEADER, value);
            }
            Ok(Err(e)) => warn!("Trace header is not a valid header value: {}", e),
            Err(e) => warn!("Could not serialize trace header: {}", e),
        }
    }

    info!(
        "Completed {} request as {}",
        if composite { "composite" } else { "pass-through" },
        output.response.model
    );
    Ok((headers, Json(output.response)).into_response())
}
