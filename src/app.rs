//! Application bootstrap.
//!
//! Builds the one router the process serves: the greeting at `/`, every
//! discovered route module's router in discovery order, then the OpenAPI
//! document, metrics and the not-found fallback.

use std::fmt;

use axum::{middleware, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use once_cell::sync::OnceCell;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};
use utoipa::OpenApi;

use crate::api::{self, handlers::not_found, AppState, RootApi};
use crate::config::Config;
use crate::discovery::{DiscoveredRouter, RouterDiscovery};
use crate::error::Result;
use crate::metrics;

static APPLICATION: OnceCell<Application> = OnceCell::new();

/// The assembled HTTP application.
#[derive(Clone)]
pub struct Application {
    router: Router,
    mounted: Vec<&'static str>,
    openapi: utoipa::openapi::OpenApi,
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("router", &self.router)
            .field("mounted", &self.mounted)
            .field("openapi_paths", &self.openapi.paths.paths.len())
            .finish()
    }
}

impl Application {
    /// Discover route modules and assemble the application.
    ///
    /// Any discovery failure aborts the bootstrap.
    #[instrument(skip_all)]
    pub fn bootstrap(
        config: &Config,
        discovery: &RouterDiscovery,
        metrics_handle: Option<PrometheusHandle>,
    ) -> Result<Self> {
        let routers = discovery.discover()?;
        Ok(Self::assemble(config, routers, metrics_handle))
    }

    /// The process-wide application over the built-in route modules.
    ///
    /// The first successful call builds it; later calls return the same instance.
    pub fn global(
        config: &Config,
        metrics_handle: Option<PrometheusHandle>,
    ) -> Result<&'static Self> {
        APPLICATION
            .get_or_try_init(|| Self::bootstrap(config, RouterDiscovery::global(), metrics_handle))
    }

    /// Mount already-discovered routers.
    pub fn assemble(
        config: &Config,
        routers: Vec<DiscoveredRouter>,
        metrics_handle: Option<PrometheusHandle>,
    ) -> Self {
        let mut app = api::create_router(AppState::new(config.greeting_message.as_str()));
        let mut openapi = RootApi::openapi();
        let mut mounted = Vec::with_capacity(routers.len());

        for discovered in routers {
            info!(module = discovered.module, "Mounting router");
            app = app.merge(discovered.router);
            if let Some(fragment) = discovered.openapi {
                openapi.merge(fragment);
            }
            metrics::inc_routers_mounted(discovered.module);
            mounted.push(discovered.module);
        }

        if config.openapi_enabled {
            match serde_json::to_value(&openapi) {
                Ok(document) => app = app.merge(api::openapi_router(document)),
                Err(e) => warn!(error = %e, "Failed to render OpenAPI document"),
            }
        }

        if config.metrics_enabled {
            if let Some(handle) = metrics_handle {
                app = app.merge(api::metrics_router(handle));
            }
        }

        let router = app
            .fallback(not_found)
            .layer(middleware::from_fn(metrics::track_metrics))
            .layer(TraceLayer::new_for_http());

        info!(routers = mounted.len(), "Application assembled");
        Self {
            router,
            mounted,
            openapi,
        }
    }

    /// Modules whose routers were mounted, in mount order.
    pub fn mounted_modules(&self) -> &[&'static str] {
        &self.mounted
    }

    /// Merged OpenAPI document.
    pub fn openapi(&self) -> &utoipa::openapi::OpenApi {
        &self.openapi
    }

    /// Router to serve.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Bootstrap an application over the given discovery. Shorthand for tests and tools.
pub fn create_app(config: &Config, discovery: &RouterDiscovery) -> Result<Router> {
    Application::bootstrap(config, discovery, None).map(|app| app.router())
}
