//! # Item Repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::auth::Scope;
use crate::error::RepositoryError;
use crate::models::item::{
    ActiveModel as ItemActiveModel, Column as ItemColumn, Entity as Item, Model as ItemModel,
};

/// Mutable item fields; a `PUT` replaces all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemChanges {
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub quantity: i32,
    pub price: f64,
    pub category_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub fields: ItemChanges,
    pub tenant_id: i32,
    pub user_id: i32,
}

/// One page of items plus the total number of rows in scope.
#[derive(Debug, Clone)]
pub struct ItemPage {
    pub items: Vec<ItemModel>,
    pub total: u64,
}

pub struct ItemRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> ItemRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create(&self, item: NewItem) -> Result<ItemModel, RepositoryError> {
        let now = Utc::now();
        let fields = item.fields;
        let model = ItemActiveModel {
            name: Set(fields.name),
            sku: Set(fields.sku),
            description: Set(fields.description),
            quantity: Set(fields.quantity),
            price: Set(fields.price),
            category_id: Set(fields.category_id),
            tenant_id: Set(item.tenant_id),
            user_id: Set(item.user_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        model
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Page `page` (1-based) of items in scope, ordered by id.
    pub async fn list_page(
        &self,
        scope: &Scope,
        page: u64,
        limit: u64,
    ) -> Result<ItemPage, RepositoryError> {
        let paginator = Item::find()
            .filter(scope.condition(ItemColumn::TenantId, ItemColumn::UserId))
            .order_by_asc(ItemColumn::Id)
            .paginate(self.db, limit.max(1));

        let total = paginator
            .num_items()
            .await
            .map_err(RepositoryError::database_error)?;
        let items = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(ItemPage { items, total })
    }

    pub async fn find(&self, item_id: i32, scope: &Scope) -> Result<Option<ItemModel>, RepositoryError> {
        Item::find_by_id(item_id)
            .filter(scope.condition(ItemColumn::TenantId, ItemColumn::UserId))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Replaces the mutable fields of an item in scope. `None` when nothing
    /// matched.
    pub async fn update(
        &self,
        item_id: i32,
        changes: ItemChanges,
        scope: &Scope,
    ) -> Result<Option<ItemModel>, RepositoryError> {
        let active = ItemActiveModel {
            name: Set(changes.name),
            sku: Set(changes.sku),
            description: Set(changes.description),
            quantity: Set(changes.quantity),
            price: Set(changes.price),
            category_id: Set(changes.category_id),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let result = Item::update_many()
            .set(active)
            .filter(ItemColumn::Id.eq(item_id))
            .filter(scope.condition(ItemColumn::TenantId, ItemColumn::UserId))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find(item_id, scope).await
    }

    pub async fn delete(&self, item_id: i32, scope: &Scope) -> Result<bool, RepositoryError> {
        let result = Item::delete_many()
            .filter(ItemColumn::Id.eq(item_id))
            .filter(scope.condition(ItemColumn::TenantId, ItemColumn::UserId))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        Ok(result.rows_affected > 0)
    }
}
