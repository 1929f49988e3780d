//! Built-in HTTP endpoints: greeting, OpenAPI document, metrics and fallback.

pub mod handlers;
pub mod routes;

pub use handlers::{AppState, RootApi};
pub use routes::{create_router, metrics_router, openapi_router};
