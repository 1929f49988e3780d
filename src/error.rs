//! Unified error types for the service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Top-level error returned while starting the service.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Router discovery failed.
    #[error("router discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while discovering route modules.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// A route module failed to load. Startup does not continue without it.
    #[error("failed to load route module `{module}`: {source}")]
    Import {
        /// Name of the module that failed.
        module: &'static str,
        /// The module's own error.
        #[source]
        source: ModuleError,
    },

    /// A route module called back into discovery while it was being loaded.
    #[error("route module `{module}` re-entered discovery while loading")]
    Reentrant {
        /// Name of the module being loaded.
        module: &'static str,
    },
}

impl DiscoveryError {
    /// Name of the route module that caused the failure.
    pub fn module(&self) -> &'static str {
        match self {
            Self::Import { module, .. } | Self::Reentrant { module } => *module,
        }
    }
}

/// Errors a route module can raise while loading.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    /// Something the module needs is not available.
    #[error("missing dependency: {0}")]
    MissingDependency(String),

    /// Module setup code failed.
    #[error("initialization failed: {0}")]
    Init(String),
}

/// Error body in the `{"detail": ...}` shape clients of the service expect.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable error detail.
    pub detail: String,
}

/// Errors returned from HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No route or resource matched.
    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    /// Status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_error_names_module_and_cause() {
        let err = DiscoveryError::Import {
            module: "billing",
            source: ModuleError::MissingDependency("payments_sdk".to_string()),
        };

        assert_eq!(err.module(), "billing");
        assert_eq!(
            err.to_string(),
            "failed to load route module `billing`: missing dependency: payments_sdk"
        );
    }

    #[test]
    fn reentrant_error_names_module() {
        let err = DiscoveryError::Reentrant { module: "loopback" };
        assert_eq!(err.module(), "loopback");
        assert_eq!(
            err.to_string(),
            "route module `loopback` re-entered discovery while loading"
        );
    }

    #[test]
    fn io_error_converts_into_app_error() {
        let err = AppError::from(std::io::Error::new(std::io::ErrorKind::AddrInUse, "taken"));
        assert!(matches!(err, AppError::Io(_)));
        assert_eq!(err.to_string(), "io error: taken");
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = ApiError::NotFound("Not Found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
