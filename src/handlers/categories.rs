//! # Category Handlers

use axum::{
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Caller;
use crate::error::ApiError;
use crate::handlers::types::{MessageResponse, requested_tenant};
use crate::models::category;
use crate::server::AppState;
use crate::services::InventoryService;

/// Request payload for creating a category
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    #[schema(example = "Tools")]
    pub name: String,
    /// Target company; required for super admins, ignored for everyone else
    #[serde(default, alias = "company_id")]
    pub tenant_id: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateCategoryRequest {
    #[schema(example = "Hand tools")]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryDto {
    pub id: i32,
    pub name: String,
    pub tenant_id: i32,
    /// Identity that created the category
    pub user_id: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<category::Model> for CategoryDto {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            tenant_id: model.tenant_id,
            user_id: model.user_id,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

/// Create a category
#[utoipa::path(
    post,
    path = "/categories",
    security(("bearer_auth" = [])),
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CategoryDto>), ApiError> {
    let Json(request) = payload?;

    let created = InventoryService::new(&state.db)
        .create_category(&caller, &request.name, requested_tenant(request.tenant_id))
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List categories visible to the caller
#[utoipa::path(
    get,
    path = "/categories",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Categories in scope", body = [CategoryDto]),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<CategoryDto>>, ApiError> {
    let categories = InventoryService::new(&state.db)
        .list_categories(&caller)
        .await?;
    Ok(Json(categories.into_iter().map(CategoryDto::from).collect()))
}

/// Fetch one category
#[utoipa::path(
    get,
    path = "/categories/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = CategoryDto),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "Category not found", body = ApiError)
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    caller: Caller,
    category_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<CategoryDto>, ApiError> {
    let Path(category_id) = category_id?;

    let category = InventoryService::new(&state.db)
        .get_category(&caller, category_id)
        .await?;
    Ok(Json(category.into()))
}

/// Rename a category
#[utoipa::path(
    put,
    path = "/categories/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Category id")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Caller does not own the category", body = ApiError),
        (status = 404, description = "Category not found", body = ApiError)
    ),
    tag = "categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    caller: Caller,
    category_id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateCategoryRequest>, JsonRejection>,
) -> Result<Json<CategoryDto>, ApiError> {
    let Path(category_id) = category_id?;
    let Json(request) = payload?;

    let updated = InventoryService::new(&state.db)
        .update_category(&caller, category_id, &request.name)
        .await?;
    Ok(Json(updated.into()))
}

/// Delete a category
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Caller does not own the category", body = ApiError),
        (status = 404, description = "Category not found", body = ApiError)
    ),
    tag = "categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    caller: Caller,
    category_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(category_id) = category_id?;

    InventoryService::new(&state.db)
        .delete_category(&caller, category_id)
        .await?;
    Ok(Json(MessageResponse::new("Category deleted")))
}
