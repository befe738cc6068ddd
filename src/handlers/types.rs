//! # Common API Types
//!
//! Response shapes shared by several handlers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;
use crate::models::{tenant, user};

/// Plain acknowledgement body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Item deleted")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Public view of an identity. The password hash is never exposed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i32,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub role: Role,
    /// Company the identity belongs to
    pub tenant_id: i32,
    pub verified: bool,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

impl From<user::Model> for UserDto {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            role: model.role,
            tenant_id: model.tenant_id,
            verified: model.verified,
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

/// Company (tenant) summary
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CompanyDto {
    pub id: i32,
    #[schema(example = "Acme Corp")]
    pub name: String,
}

impl From<tenant::Model> for CompanyDto {
    fn from(model: tenant::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// Normalizes a client-supplied tenant reference. `0` has always meant
/// "none" on the wire.
pub fn requested_tenant(tenant_id: Option<i32>) -> Option<i32> {
    tenant_id.filter(|id| *id != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_tenant_means_absent() {
        assert_eq!(requested_tenant(None), None);
        assert_eq!(requested_tenant(Some(0)), None);
        assert_eq!(requested_tenant(Some(3)), Some(3));
    }
}
