//! HTTP API route definitions.

use axum::{routing::get, Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;

use super::handlers::{root, AppState};

/// Create the router for the built-in root endpoint.
pub fn create_router(state: AppState) -> Router {
    Router::new().route("/", get(root)).with_state(state)
}

/// Serve a rendered OpenAPI document at `/openapi.json`.
pub fn openapi_router(document: Value) -> Router {
    Router::new().route(
        "/openapi.json",
        get(move || {
            let document = document.clone();
            async move { Json(document) }
        }),
    )
}

/// Serve Prometheus metrics at `/metrics`.
pub fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new().route(
        "/metrics",
        get(move || std::future::ready(handle.render())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn root_endpoint_returns_greeting() {
        let app = create_router(AppState::new("Hello, FastAPI!"));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({"message": "Hello, FastAPI!"}));
    }

    #[tokio::test]
    async fn openapi_endpoint_serves_document() {
        let app = openapi_router(json!({"openapi": "3.1.0"}));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
