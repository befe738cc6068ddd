//! # Item Handlers
//!
//! CRUD over inventory items with page/limit pagination on the listing.

use axum::{
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::Caller;
use crate::error::ApiError;
use crate::handlers::types::{MessageResponse, requested_tenant};
use crate::models::item;
use crate::server::AppState;
use crate::services::{InventoryService, ItemInput, PageRequest};

/// Item fields accepted on create and update. Update replaces every field.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ItemRequest {
    #[schema(example = "Claw hammer")]
    pub name: String,
    #[schema(example = "HAM-001")]
    pub sku: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    #[schema(example = 12)]
    pub quantity: i32,
    #[serde(default)]
    #[schema(example = 19.99)]
    pub price: f64,
    pub category_id: Option<i32>,
    /// Target company on create; required for super admins, ignored otherwise
    #[serde(default, alias = "company_id")]
    pub tenant_id: Option<i32>,
}

impl ItemRequest {
    fn into_parts(self) -> (ItemInput, Option<i32>) {
        let input = ItemInput {
            name: self.name,
            sku: self.sku,
            description: self.description,
            quantity: self.quantity,
            price: self.price,
            // `0` is "no category" on the wire, like tenant ids.
            category_id: self.category_id.filter(|id| *id != 0),
        };
        (input, requested_tenant(self.tenant_id))
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ItemDto {
    pub id: i32,
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub quantity: i32,
    pub price: f64,
    pub category_id: Option<i32>,
    pub tenant_id: i32,
    /// Identity that created the item
    pub user_id: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<item::Model> for ItemDto {
    fn from(model: item::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            sku: model.sku,
            description: model.description,
            quantity: model.quantity,
            price: model.price,
            category_id: model.category_id,
            tenant_id: model.tenant_id,
            user_id: model.user_id,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

/// Query parameters for item listing
#[derive(Debug, Deserialize, Serialize, IntoParams, ToSchema)]
pub struct ListItemsQuery {
    /// Page number, starting at 1 (default: 1)
    pub page: Option<u64>,
    /// Page size (default: 10, max: 100)
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ItemsPageResponse {
    pub items: Vec<ItemDto>,
    pub page: u64,
    pub limit: u64,
    /// Number of items in scope across all pages
    pub total: u64,
}

/// Create an item
#[utoipa::path(
    post,
    path = "/items",
    security(("bearer_auth" = [])),
    request_body = ItemRequest,
    responses(
        (status = 201, description = "Item created", body = ItemDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "items"
)]
pub async fn create_item(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<ItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ItemDto>), ApiError> {
    let Json(request) = payload?;
    let (input, tenant) = request.into_parts();

    let created = InventoryService::new(&state.db)
        .create_item(&caller, input, tenant)
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List items visible to the caller
#[utoipa::path(
    get,
    path = "/items",
    security(("bearer_auth" = [])),
    params(ListItemsQuery),
    responses(
        (status = 200, description = "One page of items", body = ItemsPageResponse),
        (status = 400, description = "Malformed query", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "items"
)]
pub async fn list_items(
    State(state): State<AppState>,
    caller: Caller,
    query: Result<Query<ListItemsQuery>, QueryRejection>,
) -> Result<Json<ItemsPageResponse>, ApiError> {
    let Query(query) = query?;
    let page = PageRequest::new(query.page, query.limit);

    let result = InventoryService::new(&state.db)
        .list_items(&caller, page)
        .await?;

    Ok(Json(ItemsPageResponse {
        items: result.items.into_iter().map(ItemDto::from).collect(),
        page: page.page,
        limit: page.limit,
        total: result.total,
    }))
}

/// Fetch one item
#[utoipa::path(
    get,
    path = "/items/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item", body = ItemDto),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "Item not found", body = ApiError)
    ),
    tag = "items"
)]
pub async fn get_item(
    State(state): State<AppState>,
    caller: Caller,
    item_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<ItemDto>, ApiError> {
    let Path(item_id) = item_id?;

    let item = InventoryService::new(&state.db)
        .get_item(&caller, item_id)
        .await?;
    Ok(Json(item.into()))
}

/// Replace an item's fields
#[utoipa::path(
    put,
    path = "/items/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Item id")),
    request_body = ItemRequest,
    responses(
        (status = 200, description = "Item updated", body = ItemDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Caller does not own the item", body = ApiError),
        (status = 404, description = "Item not found", body = ApiError)
    ),
    tag = "items"
)]
pub async fn update_item(
    State(state): State<AppState>,
    caller: Caller,
    item_id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<ItemRequest>, JsonRejection>,
) -> Result<Json<ItemDto>, ApiError> {
    let Path(item_id) = item_id?;
    let Json(request) = payload?;
    // An item never moves between companies.
    let (input, _) = request.into_parts();

    let updated = InventoryService::new(&state.db)
        .update_item(&caller, item_id, input)
        .await?;
    Ok(Json(updated.into()))
}

/// Delete an item
#[utoipa::path(
    delete,
    path = "/items/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Caller does not own the item", body = ApiError),
        (status = 404, description = "Item not found", body = ApiError)
    ),
    tag = "items"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    caller: Caller,
    item_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(item_id) = item_id?;

    InventoryService::new(&state.db)
        .delete_item(&caller, item_id)
        .await?;
    Ok(Json(MessageResponse::new("Item deleted")))
}
