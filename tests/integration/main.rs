//! Integration tests against a live listener.
//!
//! Each test binds an ephemeral port on localhost, serves the application
//! and talks to it over real HTTP.

use std::net::SocketAddr;

use autoroute::discovery::{ModuleEntry, RouteModule, RouterDiscovery};
use autoroute::error::ModuleError;
use autoroute::{create_app, AppError, Config};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Serve a router on an ephemeral port and return its address.
async fn spawn(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn get(addr: SocketAddr, path: &str) -> (u16, Value) {
    let response = reqwest::get(format!("http://{}{}", addr, path))
        .await
        .unwrap();
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn builtin_catalog_serves_root_and_modules() {
    let discovery = RouterDiscovery::new(autoroute::routers::CATALOG.iter().copied());
    let addr = spawn(create_app(&Config::default(), &discovery).unwrap()).await;

    assert_eq!(
        get(addr, "/").await,
        (200, json!({"message": "Hello, FastAPI!"}))
    );
    assert_eq!(get(addr, "/health").await, (200, json!({"status": "ok"})));

    let (status, items) = get(addr, "/items").await;
    assert_eq!(status, 200);
    assert_eq!(items.as_array().map(Vec::len), Some(3));

    assert_eq!(
        get(addr, "/does-not-exist").await,
        (404, json!({"detail": "Not Found"}))
    );
}

#[tokio::test]
async fn empty_catalog_serves_only_root() {
    let app = create_app(&Config::default(), &RouterDiscovery::new(Vec::new())).unwrap();
    let addr = spawn(app).await;

    assert_eq!(get(addr, "/").await.0, 200);
    assert_eq!(get(addr, "/items").await.0, 404);
    assert_eq!(get(addr, "/health").await.0, 404);
}

struct NeedsMissingCrate;

impl RouteModule for NeedsMissingCrate {
    fn load(&self) -> Result<Option<Router>, ModuleError> {
        Err(ModuleError::MissingDependency("nonexistent_package".to_string()))
    }
}

static NEEDS_MISSING_CRATE: NeedsMissingCrate = NeedsMissingCrate;

#[test]
fn broken_module_prevents_startup() {
    let discovery = RouterDiscovery::new(
        autoroute::routers::CATALOG
            .iter()
            .copied()
            .chain([ModuleEntry::new("broken", &NEEDS_MISSING_CRATE)]),
    );

    let err = create_app(&Config::default(), &discovery).unwrap_err();
    assert!(matches!(err, AppError::Discovery(_)));
    assert!(err.to_string().contains("nonexistent_package"));
}
