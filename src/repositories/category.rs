//! # Category Repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::auth::Scope;
use crate::error::RepositoryError;
use crate::models::category::{
    ActiveModel as CategoryActiveModel, Column as CategoryColumn, Entity as Category,
    Model as CategoryModel,
};

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub tenant_id: i32,
    pub user_id: i32,
}

pub struct CategoryRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> CategoryRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create(&self, category: NewCategory) -> Result<CategoryModel, RepositoryError> {
        let now = Utc::now();
        let model = CategoryActiveModel {
            name: Set(category.name),
            tenant_id: Set(category.tenant_id),
            user_id: Set(category.user_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        model
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn list(&self, scope: &Scope) -> Result<Vec<CategoryModel>, RepositoryError> {
        Category::find()
            .filter(scope.condition(CategoryColumn::TenantId, CategoryColumn::UserId))
            .order_by_asc(CategoryColumn::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find(
        &self,
        category_id: i32,
        scope: &Scope,
    ) -> Result<Option<CategoryModel>, RepositoryError> {
        Category::find_by_id(category_id)
            .filter(scope.condition(CategoryColumn::TenantId, CategoryColumn::UserId))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Renames a category, constrained by `scope`. Returns `None` when no row
    /// in scope matched.
    pub async fn rename(
        &self,
        category_id: i32,
        name: String,
        scope: &Scope,
    ) -> Result<Option<CategoryModel>, RepositoryError> {
        let changes = CategoryActiveModel {
            name: Set(name),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let result = Category::update_many()
            .set(changes)
            .filter(CategoryColumn::Id.eq(category_id))
            .filter(scope.condition(CategoryColumn::TenantId, CategoryColumn::UserId))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find(category_id, scope).await
    }

    pub async fn delete(&self, category_id: i32, scope: &Scope) -> Result<bool, RepositoryError> {
        let result = Category::delete_many()
            .filter(CategoryColumn::Id.eq(category_id))
            .filter(scope.condition(CategoryColumn::TenantId, CategoryColumn::UserId))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::repositories::test_support::setup_db;
    use crate::repositories::{IdentityRepository, NewIdentity, TenantRepository};

    async fn seed_owner(db: &sea_orm::DatabaseConnection, tenant: &str) -> (i32, i32) {
        let tenant = TenantRepository::new(db).create(tenant).await.unwrap();
        let user = IdentityRepository::new(db)
            .create(NewIdentity {
                username: "owner".to_string(),
                email: format!("owner@{}.io", tenant.id),
                password_hash: "$argon2id$fake".to_string(),
                role: Role::Admin,
                tenant_id: tenant.id,
                verified: true,
            })
            .await
            .unwrap();
        (tenant.id, user.id)
    }

    #[tokio::test]
    async fn scoped_mutations_ignore_rows_outside_scope() {
        let db = setup_db().await;
        let (tenant_a, owner_a) = seed_owner(&db, "A").await;
        let (tenant_b, _) = seed_owner(&db, "B").await;
        let repo = CategoryRepository::new(&db);

        let category = repo
            .create(NewCategory {
                name: "Tools".to_string(),
                tenant_id: tenant_a,
                user_id: owner_a,
            })
            .await
            .unwrap();

        let other_tenant = Scope {
            tenant_id: Some(tenant_b),
            owner_user_id: None,
        };
        assert!(repo.find(category.id, &other_tenant).await.unwrap().is_none());
        assert!(
            repo.rename(category.id, "Hacked".to_string(), &other_tenant)
                .await
                .unwrap()
                .is_none()
        );
        assert!(!repo.delete(category.id, &other_tenant).await.unwrap());

        let own_tenant = Scope {
            tenant_id: Some(tenant_a),
            owner_user_id: None,
        };
        let renamed = repo
            .rename(category.id, "Hardware".to_string(), &own_tenant)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "Hardware");
        assert_eq!(repo.list(&own_tenant).await.unwrap().len(), 1);
        assert!(repo.delete(category.id, &own_tenant).await.unwrap());
    }
}
