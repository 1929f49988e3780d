//! Read-only item listing.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::debug;
use utoipa::{OpenApi, ToSchema};

use crate::discovery::RouteModule;
use crate::error::{ApiError, ModuleError};

/// Route module serving `/items`.
pub struct ItemsModule;

/// Catalog export.
pub static MODULE: ItemsModule = ItemsModule;

/// A listed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Item {
    /// Item identifier.
    pub id: u32,
    /// Display name.
    pub name: String,
}

type Catalog = Arc<Vec<Item>>;

fn seed_items() -> Vec<Item> {
    ["Widget", "Gadget", "Gizmo"]
        .iter()
        .zip(1..)
        .map(|(name, id)| Item {
            id,
            name: name.to_string(),
        })
        .collect()
}

/// List all items.
#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    responses((status = 200, description = "All items", body = [Item]))
)]
pub async fn list_items(State(items): State<Catalog>) -> Json<Vec<Item>> {
    Json(items.as_ref().clone())
}

/// Fetch one item by id.
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "items",
    params(("id" = u32, Path, description = "Item identifier")),
    responses(
        (status = 200, description = "The item", body = Item),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_item(
    State(items): State<Catalog>,
    Path(id): Path<u32>,
) -> Result<Json<Item>, ApiError> {
    items
        .iter()
        .find(|item| item.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))
}

#[derive(OpenApi)]
#[openapi(paths(list_items, get_item), components(schemas(Item)))]
struct ItemsApi;

impl RouteModule for ItemsModule {
    fn load(&self) -> Result<Option<Router>, ModuleError> {
        let items: Catalog = Arc::new(seed_items());
        debug!(count = items.len(), "Seeded item catalog");

        let router = Router::new()
            .route("/items", get(list_items))
            .route("/items/:id", get(get_item))
            .with_state(items);
        Ok(Some(router))
    }

    fn openapi(&self) -> Option<utoipa::openapi::OpenApi> {
        Some(ItemsApi::openapi())
    }
}
