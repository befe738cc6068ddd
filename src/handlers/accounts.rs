//! # Account Handlers
//!
//! Public endpoints: signup, login and the company directory.

use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;
use crate::error::ApiError;
use crate::handlers::types::{CompanyDto, UserDto, requested_tenant};
use crate::server::AppState;
use crate::services::{AccountService, SignupRequest, TenantRef};

/// Signup payload. Omit `tenant_id` (or send `0`) to found a new company.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignupRequestDto {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "correct horse battery")]
    pub password: String,
    /// Existing company to join; the account stays pending until approved
    #[serde(default, alias = "company_id")]
    pub tenant_id: Option<i32>,
    /// Name for a new company; defaults to "<username>'s Company"
    #[serde(default, alias = "company_name")]
    pub tenant_name: Option<String>,
}

impl From<SignupRequestDto> for SignupRequest {
    fn from(dto: SignupRequestDto) -> Self {
        let tenant = match requested_tenant(dto.tenant_id) {
            Some(id) => TenantRef::Existing(id),
            None => TenantRef::New {
                name: dto.tenant_name,
            },
        };
        Self {
            username: dto.username,
            email: dto.email,
            password: dto.password,
            tenant,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignupResponse {
    #[schema(example = "User created successfully")]
    pub message: String,
    pub user: UserDto,
    pub company: CompanyDto,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequestDto {
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub password: String,
}

/// Identity summary returned on login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginUserDto {
    pub id: i32,
    /// Username
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Company id
    pub company: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for the `Authorization` header
    pub token: String,
    /// Token expiry (RFC 3339)
    pub expires_at: String,
    pub user: LoginUserDto,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequestDto,
    responses(
        (status = 201, description = "Account created", body = SignupResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 409, description = "Email or company name already taken", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "accounts"
)]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequestDto>, JsonRejection>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let Json(request) = payload?;

    let outcome = AccountService::new(&state.db, &state.tokens)
        .signup(request.into())
        .await?;

    let message = if outcome.identity.verified {
        "User created successfully"
    } else {
        "User created successfully; awaiting approval from a company admin"
    };

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: message.to_string(),
            user: outcome.identity.into(),
            company: outcome.tenant.into(),
        }),
    ))
}

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Malformed request", body = ApiError),
        (status = 401, description = "Invalid credentials", body = ApiError),
        (status = 403, description = "Account pending approval", body = ApiError)
    ),
    tag = "accounts"
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequestDto>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;

    let outcome = AccountService::new(&state.db, &state.tokens)
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token: outcome.token.token,
        expires_at: outcome.token.expires_at.to_rfc3339(),
        user: LoginUserDto {
            id: outcome.identity.id,
            name: outcome.identity.username,
            email: outcome.identity.email,
            role: outcome.identity.role,
            company: outcome.tenant.id,
        },
    }))
}

/// List companies available to join
#[utoipa::path(
    get,
    path = "/companies",
    responses(
        (status = 200, description = "All companies", body = [CompanyDto])
    ),
    tag = "accounts"
)]
pub async fn list_companies(State(state): State<AppState>) -> Result<Json<Vec<CompanyDto>>, ApiError> {
    let tenants = AccountService::new(&state.db, &state.tokens)
        .list_tenants()
        .await?;
    Ok(Json(tenants.into_iter().map(CompanyDto::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(tenant_id: Option<i32>, tenant_name: Option<&str>) -> SignupRequestDto {
        SignupRequestDto {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "password123".to_string(),
            tenant_id,
            tenant_name: tenant_name.map(str::to_string),
        }
    }

    #[test]
    fn signup_dto_maps_tenant_reference() {
        let request: SignupRequest = dto(None, Some("Acme")).into();
        assert_eq!(
            request.tenant,
            TenantRef::New {
                name: Some("Acme".to_string())
            }
        );

        let request: SignupRequest = dto(Some(0), None).into();
        assert_eq!(request.tenant, TenantRef::New { name: None });

        let request: SignupRequest = dto(Some(4), Some("ignored")).into();
        assert_eq!(request.tenant, TenantRef::Existing(4));
    }

    #[test]
    fn signup_dto_accepts_company_alias() {
        let parsed: SignupRequestDto = serde_json::from_value(serde_json::json!({
            "username": "bob",
            "email": "bob@example.com",
            "password": "password123",
            "company_id": 2
        }))
        .unwrap();
        assert_eq!(parsed.tenant_id, Some(2));
    }
}
