//! # User Approval Handlers
//!
//! Admin endpoints for reviewing identities that asked to join a company.

use axum::{
    extract::{Path, State, rejection::PathRejection},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Caller;
use crate::error::ApiError;
use crate::handlers::types::{MessageResponse, UserDto};
use crate::server::AppState;
use crate::services::AccountService;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyUserResponse {
    #[schema(example = "User verified successfully")]
    pub message: String,
    pub user: UserDto,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PendingUsersResponse {
    pub pending_users: Vec<UserDto>,
}

/// Approve a pending identity
#[utoipa::path(
    put,
    path = "/users/{id}/verify",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Identity id")),
    responses(
        (status = 200, description = "Identity verified", body = VerifyUserResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Caller is not an admin", body = ApiError),
        (status = 404, description = "No such identity in the caller's company", body = ApiError)
    ),
    tag = "users"
)]
pub async fn verify_user(
    State(state): State<AppState>,
    caller: Caller,
    user_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<VerifyUserResponse>, ApiError> {
    let Path(user_id) = user_id?;

    let identity = AccountService::new(&state.db, &state.tokens)
        .approve(&caller, user_id)
        .await?;

    Ok(Json(VerifyUserResponse {
        message: "User verified successfully".to_string(),
        user: identity.into(),
    }))
}

/// Reject and delete a pending identity
#[utoipa::path(
    delete,
    path = "/users/{id}/reject",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Identity id")),
    responses(
        (status = 200, description = "Identity rejected", body = MessageResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Caller is not an admin", body = ApiError),
        (status = 404, description = "No such pending identity in the caller's company", body = ApiError)
    ),
    tag = "users"
)]
pub async fn reject_user(
    State(state): State<AppState>,
    caller: Caller,
    user_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(user_id) = user_id?;

    AccountService::new(&state.db, &state.tokens)
        .reject(&caller, user_id)
        .await?;

    Ok(Json(MessageResponse::new("User rejected successfully")))
}

/// List identities awaiting approval
#[utoipa::path(
    get,
    path = "/users/pending",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pending identities", body = PendingUsersResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Caller is not an admin", body = ApiError)
    ),
    tag = "users"
)]
pub async fn list_pending_users(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<PendingUsersResponse>, ApiError> {
    let pending = AccountService::new(&state.db, &state.tokens)
        .list_pending(&caller)
        .await?;

    Ok(Json(PendingUsersResponse {
        pending_users: pending.into_iter().map(UserDto::from).collect(),
    }))
}
