//! HTTP service skeleton with auto-mounted route modules.
//!
//! The service answers `GET /` with a greeting and mounts every router
//! exported by the route modules under [`routers`]. Discovery runs once at
//! startup, in lexicographic module order, and a module that fails to load
//! stops the service from starting.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`discovery`]: Route module catalog scanning
//! - [`routers`]: Built-in route modules
//! - [`app`]: Application bootstrap
//! - [`api`]: Greeting, OpenAPI and metrics endpoints
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod app;
pub mod config;
pub mod discovery;
pub mod error;
pub mod metrics;
pub mod routers;
pub mod utils;

pub use app::{create_app, Application};
pub use config::Config;
pub use discovery::{
    discover_routers, DiscoveredRouter, ModuleEntry, RouteModule, RouterDiscovery,
};
pub use error::{AppError, Result};
