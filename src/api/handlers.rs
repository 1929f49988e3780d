//! HTTP API handlers owned by the application itself.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::error::ApiError;

/// Application state shared with the built-in handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Message served at `/`.
    pub greeting: Arc<str>,
}

impl AppState {
    /// Create new app state.
    pub fn new(greeting: impl Into<Arc<str>>) -> Self {
        Self {
            greeting: greeting.into(),
        }
    }
}

/// Root response.
#[derive(Debug, Serialize, ToSchema)]
pub struct Greeting {
    /// Greeting text.
    pub message: String,
}

/// Root handler - returns the configured greeting.
#[utoipa::path(
    get,
    path = "/",
    tag = "root",
    responses((status = 200, description = "Greeting", body = Greeting))
)]
pub async fn root(State(state): State<AppState>) -> Json<Greeting> {
    Json(Greeting {
        message: state.greeting.to_string(),
    })
}

/// Fallback for unmatched routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Not Found".to_string())
}

/// OpenAPI document for the built-in routes. Route modules merge theirs into it.
#[derive(OpenApi)]
#[openapi(
    info(title = "autoroute", description = "Greeting endpoint plus discovered route modules"),
    paths(root),
    components(schemas(Greeting))
)]
pub struct RootApi;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn root_returns_configured_greeting() {
        let state = AppState::new("Hello, FastAPI!");
        let Json(greeting) = root(State(state)).await;
        assert_eq!(greeting.message, "Hello, FastAPI!");
    }

    #[tokio::test]
    async fn fallback_is_404() {
        let response = not_found().await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn root_api_documents_root_path() {
        let doc = RootApi::openapi();
        assert!(doc.paths.paths.contains_key("/"));
    }
}
