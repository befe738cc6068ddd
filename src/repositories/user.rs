//! # Identity Repository
//!
//! Persistence for identities (the `users` table). Every lookup that can be
//! reached by a caller takes a [`Scope`] so tenant isolation is enforced in
//! the query itself.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::auth::{Role, Scope};
use crate::error::RepositoryError;
use crate::models::user::{
    ActiveModel as UserActiveModel, Column as UserColumn, Entity as User, Model as UserModel,
};

/// Fields required to create an identity.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub tenant_id: i32,
    pub verified: bool,
}

pub struct IdentityRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> IdentityRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create(&self, identity: NewIdentity) -> Result<UserModel, RepositoryError> {
        let model = UserActiveModel {
            username: Set(identity.username),
            email: Set(identity.email),
            password_hash: Set(identity.password_hash),
            role: Set(identity.role),
            tenant_id: Set(identity.tenant_id),
            verified: Set(identity.verified),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        model
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Exact, case-sensitive email match.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, RepositoryError> {
        User::find()
            .filter(UserColumn::Email.eq(email))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, RepositoryError> {
        let count = User::find()
            .filter(UserColumn::Email.eq(email))
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        Ok(count > 0)
    }

    pub async fn find_in_scope(
        &self,
        user_id: i32,
        scope: &Scope,
    ) -> Result<Option<UserModel>, RepositoryError> {
        User::find_by_id(user_id)
            .filter(scope.tenant_condition(UserColumn::TenantId))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Unverified plain users within `scope`, oldest first.
    pub async fn list_pending(&self, scope: &Scope) -> Result<Vec<UserModel>, RepositoryError> {
        User::find()
            .filter(UserColumn::Verified.eq(false))
            .filter(UserColumn::Role.eq(Role::User))
            .filter(scope.tenant_condition(UserColumn::TenantId))
            .order_by_asc(UserColumn::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn mark_verified(&self, identity: UserModel) -> Result<UserModel, RepositoryError> {
        if identity.verified {
            return Ok(identity);
        }
        let mut active = identity.into_active_model();
        active.verified = Set(true);
        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Deletes a still-pending identity inside `scope`. Returns whether a row
    /// was removed; verified identities are never touched.
    pub async fn delete_pending(&self, user_id: i32, scope: &Scope) -> Result<bool, RepositoryError> {
        let result = User::delete_many()
            .filter(UserColumn::Id.eq(user_id))
            .filter(UserColumn::Verified.eq(false))
            .filter(scope.tenant_condition(UserColumn::TenantId))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        Ok(result.rows_affected > 0)
    }

    pub async fn exists_with_role(&self, role: Role) -> Result<bool, RepositoryError> {
        let count = User::find()
            .filter(UserColumn::Role.eq(role))
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        Ok(count > 0)
    }
}
