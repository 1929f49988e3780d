//! Prometheus metrics for request latency and startup tracking.
//!
//! This module provides metrics for:
//! - HTTP request count and latency per matched route
//! - Route module load latency
//! - Route modules loaded and routers mounted at startup

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// HTTP requests counter metric name.
pub const METRIC_HTTP_REQUESTS: &str = "http_requests_total";
/// Route module load latency metric name.
pub const METRIC_MODULE_LOAD_LATENCY: &str = "route_module_load_latency_ms";
/// Route modules loaded counter metric name.
pub const METRIC_MODULES_LOADED: &str = "route_modules_loaded_total";
/// Routers mounted counter metric name.
pub const METRIC_ROUTERS_MOUNTED: &str = "routers_mounted_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );
    describe_histogram!(
        METRIC_MODULE_LOAD_LATENCY,
        "Time spent loading a route module in milliseconds"
    );

    describe_counter!(METRIC_HTTP_REQUESTS, "Total number of HTTP requests served");
    describe_counter!(
        METRIC_MODULES_LOADED,
        "Total number of route modules loaded"
    );
    describe_counter!(
        METRIC_ROUTERS_MOUNTED,
        "Total number of routers mounted into the application"
    );

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder. Only the first call in a process succeeds.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Record HTTP request latency.
pub fn record_http_latency(start: Instant, method: &str, endpoint: &str, status: u16) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    let labels = [
        ("method", method.to_string()),
        ("endpoint", endpoint.to_string()),
        ("status", status.to_string()),
    ];
    histogram!(METRIC_HTTP_REQUEST_LATENCY, &labels).record(latency_ms);
    counter!(METRIC_HTTP_REQUESTS, &labels).increment(1);
}

/// Increment route modules loaded counter.
pub fn inc_modules_loaded(module: &'static str) {
    counter!(METRIC_MODULES_LOADED, "module" => module).increment(1);
}

/// Increment routers mounted counter.
pub fn inc_routers_mounted(module: &'static str) {
    counter!(METRIC_ROUTERS_MOUNTED, "module" => module).increment(1);
}

/// Middleware recording latency and count for every request.
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let endpoint = match req.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_owned(),
        None => "unmatched".to_owned(),
    };
    let method = req.method().to_string();

    let response = next.run(req).await;

    record_http_latency(start, &method, &endpoint, response.status().as_u16());
    response
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
    module: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric, labelled by route module.
    pub fn new(metric_name: &'static str, module: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
            module,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let latency_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        histogram!(self.metric_name, "module" => self.module).record(latency_ms);
    }
}

/// Create a latency timer for loading a route module.
pub fn timer_module_load(module: &'static str) -> LatencyTimer {
    LatencyTimer::new(METRIC_MODULE_LOAD_LATENCY, module)
}
