//! # Tenant Repository
//!
//! Creation and lookup of tenants. Tenants are never deleted here.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::error::RepositoryError;
use crate::models::tenant::{
    ActiveModel as TenantActiveModel, Column as TenantColumn, Entity as Tenant,
    Model as TenantModel,
};

const MAX_TENANT_NAME_LEN: usize = 255;

/// Repository for Tenant database operations
pub struct TenantRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> TenantRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Create a new tenant. A duplicate name surfaces as a unique violation.
    pub async fn create(&self, name: &str) -> Result<TenantModel, RepositoryError> {
        let name = validate_tenant_name(name)?;

        let tenant = TenantActiveModel {
            name: Set(name.to_string()),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        tenant
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_id(&self, tenant_id: i32) -> Result<Option<TenantModel>, RepositoryError> {
        Tenant::find_by_id(tenant_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<TenantModel>, RepositoryError> {
        Tenant::find()
            .filter(TenantColumn::Name.eq(name))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn exists(&self, tenant_id: i32) -> Result<bool, RepositoryError> {
        Ok(self.find_by_id(tenant_id).await?.is_some())
    }

    /// All tenants ordered by id.
    pub async fn list(&self) -> Result<Vec<TenantModel>, RepositoryError> {
        Tenant::find()
            .order_by_asc(TenantColumn::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}

/// Trims and bounds-checks a tenant name.
pub fn validate_tenant_name(name: &str) -> Result<&str, RepositoryError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RepositoryError::validation_error(
            "Company name cannot be empty",
        ));
    }
    if trimmed.chars().count() > MAX_TENANT_NAME_LEN {
        return Err(RepositoryError::validation_error(
            "Company name cannot exceed 255 characters",
        ));
    }
    Ok(trimmed)
}
