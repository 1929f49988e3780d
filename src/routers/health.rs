//! Liveness endpoint.

use axum::{response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::discovery::RouteModule;
use crate::error::ModuleError;

/// Route module serving `GET /health`.
pub struct HealthModule;

/// Catalog export.
pub static MODULE: HealthModule = HealthModule;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: String,
}

/// Health check handler - always returns 200.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is alive", body = HealthResponse))
)]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[derive(OpenApi)]
#[openapi(paths(health), components(schemas(HealthResponse)))]
struct HealthApi;

impl RouteModule for HealthModule {
    fn load(&self) -> Result<Option<Router>, ModuleError> {
        Ok(Some(Router::new().route("/health", get(health))))
    }

    fn openapi(&self) -> Option<utoipa::openapi::OpenApi> {
        Some(HealthApi::openapi())
    }
}
