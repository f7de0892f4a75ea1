//! OpenAI-compatible HTTP API
//!
//! | Route                       | Handler                              |
//! |-----------------------------|--------------------------------------|
//! | `GET /health`               | [`handlers::health`]                 |
//! | `GET /v1/models`            | [`handlers::list_models`]            |
//! | `POST /v1/chat/completions` | [`handlers::chat_completions`]       |

pub mod dto;
pub mod error;
pub mod handlers;

pub use error::ApiError;
pub use handlers::DETAILS_HEADER;

use axum::Router;
use axum::routing::{get, post};
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use trio_application::{CompletionClient, RunCompletionUseCase};

/// Shared state handed to every handler
pub struct AppState<C: CompletionClient + 'static> {
    pub use_case: RunCompletionUseCase<C>,
}

impl<C: CompletionClient + 'static> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            use_case: self.use_case.clone(),
        }
    }
}

impl<C: CompletionClient + 'static> AppState<C> {
    pub fn new(use_case: RunCompletionUseCase<C>) -> Self {
        Self { use_case }
    }
}

/// Build the router with permissive CORS
pub fn router<C: CompletionClient + 'static>(state: AppState<C>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/v1/models", get(handlers::list_models))
        .route("/v1/chat/completions", post(handlers::chat_completions::<C>))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve `router` on `listener` until `shutdown` resolves
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
