//! Category and item operations, each gated by the authorizer.
//!
//! Reads fetch through the caller's tenant scope, so rows in other tenants
//! look missing. Mutations re-authorize against the fetched row and then run
//! with the resulting scope in the `WHERE` clause.

use sea_orm::DatabaseConnection;

use crate::auth::{Action, Caller, Role, Scope, Target, authorize, scope_for};
use crate::error::ServiceError;
use crate::models::{category, item};
use crate::repositories::{
    CategoryRepository, ItemChanges, ItemPage, ItemRepository, NewCategory, NewItem,
    TenantRepository,
};
use crate::services::validation;

const CATEGORY_RESOURCE: &str = "Category";
const ITEM_RESOURCE: &str = "Item";

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_LIMIT: u64 = 10;
pub const MAX_PAGE_LIMIT: u64 = 100;

/// Page request with out-of-range values clamped rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        let limit = limit
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .min(MAX_PAGE_LIMIT);
        // The row offset `(page - 1) * limit` must fit a signed 64-bit OFFSET.
        let last_page = i64::MAX as u64 / limit + 1;
        let page = page
            .filter(|p| *p >= 1)
            .unwrap_or(DEFAULT_PAGE)
            .min(last_page);
        Self { page, limit }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Raw item fields as supplied by a client.
#[derive(Debug, Clone, Default)]
pub struct ItemInput {
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub quantity: i32,
    pub price: f64,
    pub category_id: Option<i32>,
}

impl ItemInput {
    fn validate(self) -> Result<ItemChanges, ServiceError> {
        Ok(ItemChanges {
            name: validation::name("name", &self.name)?,
            sku: validation::sku(self.sku)?,
            description: validation::optional_text(self.description),
            quantity: validation::quantity(self.quantity)?,
            price: validation::price(self.price)?,
            category_id: self.category_id,
        })
    }
}

pub struct InventoryService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> InventoryService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    // Categories

    pub async fn create_category(
        &self,
        caller: &Caller,
        name: &str,
        requested_tenant: Option<i32>,
    ) -> Result<category::Model, ServiceError> {
        let name = validation::name("name", name)?;
        let tenant_id = self
            .creation_tenant(caller, requested_tenant, CATEGORY_RESOURCE)
            .await?;

        let created = CategoryRepository::new(self.db)
            .create(NewCategory {
                name,
                tenant_id,
                user_id: caller.user_id,
            })
            .await?;

        tracing::info!(
            category_id = created.id,
            tenant_id,
            user_id = caller.user_id,
            "Category created"
        );
        Ok(created)
    }

    pub async fn list_categories(&self, caller: &Caller) -> Result<Vec<category::Model>, ServiceError> {
        let scope = pre_lookup_scope(caller, Action::List, CATEGORY_RESOURCE)?;
        Ok(CategoryRepository::new(self.db).list(&scope).await?)
    }

    pub async fn get_category(
        &self,
        caller: &Caller,
        category_id: i32,
    ) -> Result<category::Model, ServiceError> {
        let scope = pre_lookup_scope(caller, Action::Read, CATEGORY_RESOURCE)?;
        CategoryRepository::new(self.db)
            .find(category_id, &scope)
            .await?
            .ok_or(ServiceError::NotFound(CATEGORY_RESOURCE))
    }

    pub async fn update_category(
        &self,
        caller: &Caller,
        category_id: i32,
        name: &str,
    ) -> Result<category::Model, ServiceError> {
        let name = validation::name("name", name)?;
        let existing = self.get_category(caller, category_id).await?;
        let scope = row_scope(
            caller,
            Action::Update,
            Target::new(existing.tenant_id, existing.user_id),
            CATEGORY_RESOURCE,
        )?;

        CategoryRepository::new(self.db)
            .rename(category_id, name, &scope)
            .await?
            .ok_or(ServiceError::NotFound(CATEGORY_RESOURCE))
    }

    pub async fn delete_category(&self, caller: &Caller, category_id: i32) -> Result<(), ServiceError> {
        let existing = self.get_category(caller, category_id).await?;
        let scope = row_scope(
            caller,
            Action::Delete,
            Target::new(existing.tenant_id, existing.user_id),
            CATEGORY_RESOURCE,
        )?;

        if !CategoryRepository::new(self.db)
            .delete(category_id, &scope)
            .await?
        {
            return Err(ServiceError::NotFound(CATEGORY_RESOURCE));
        }
        tracing::info!(category_id, user_id = caller.user_id, "Category deleted");
        Ok(())
    }

    // Items

    pub async fn create_item(
        &self,
        caller: &Caller,
        input: ItemInput,
        requested_tenant: Option<i32>,
    ) -> Result<item::Model, ServiceError> {
        let fields = input.validate()?;
        let tenant_id = self
            .creation_tenant(caller, requested_tenant, ITEM_RESOURCE)
            .await?;
        self.ensure_category_in_tenant(fields.category_id, tenant_id)
            .await?;

        let created = ItemRepository::new(self.db)
            .create(NewItem {
                fields,
                tenant_id,
                user_id: caller.user_id,
            })
            .await?;

        tracing::info!(
            item_id = created.id,
            tenant_id,
            user_id = caller.user_id,
            "Item created"
        );
        Ok(created)
    }

    pub async fn list_items(&self, caller: &Caller, page: PageRequest) -> Result<ItemPage, ServiceError> {
        let scope = pre_lookup_scope(caller, Action::List, ITEM_RESOURCE)?;
        Ok(ItemRepository::new(self.db)
            .list_page(&scope, page.page, page.limit)
            .await?)
    }

    pub async fn get_item(&self, caller: &Caller, item_id: i32) -> Result<item::Model, ServiceError> {
        let scope = pre_lookup_scope(caller, Action::Read, ITEM_RESOURCE)?;
        ItemRepository::new(self.db)
            .find(item_id, &scope)
            .await?
            .ok_or(ServiceError::NotFound(ITEM_RESOURCE))
    }

    pub async fn update_item(
        &self,
        caller: &Caller,
        item_id: i32,
        input: ItemInput,
    ) -> Result<item::Model, ServiceError> {
        let changes = input.validate()?;
        let existing = self.get_item(caller, item_id).await?;
        let scope = row_scope(
            caller,
            Action::Update,
            Target::new(existing.tenant_id, existing.user_id),
            ITEM_RESOURCE,
        )?;
        self.ensure_category_in_tenant(changes.category_id, existing.tenant_id)
            .await?;

        ItemRepository::new(self.db)
            .update(item_id, changes, &scope)
            .await?
            .ok_or(ServiceError::NotFound(ITEM_RESOURCE))
    }

    pub async fn delete_item(&self, caller: &Caller, item_id: i32) -> Result<(), ServiceError> {
        let existing = self.get_item(caller, item_id).await?;
        let scope = row_scope(
            caller,
            Action::Delete,
            Target::new(existing.tenant_id, existing.user_id),
            ITEM_RESOURCE,
        )?;

        if !ItemRepository::new(self.db).delete(item_id, &scope).await? {
            return Err(ServiceError::NotFound(ITEM_RESOURCE));
        }
        tracing::info!(item_id, user_id = caller.user_id, "Item deleted");
        Ok(())
    }

    /// Resolves the tenant a new row belongs to. Super admins name it
    /// explicitly and it has to exist; everyone else gets their own.
    async fn creation_tenant(
        &self,
        caller: &Caller,
        requested_tenant: Option<i32>,
        resource: &'static str,
    ) -> Result<i32, ServiceError> {
        let scope = authorize(caller, Action::Create, Target::requested_tenant(requested_tenant))
            .into_result()
            .map_err(|r| ServiceError::denied(r, resource))?;
        let tenant_id = scope
            .creation_tenant()
            .ok_or_else(|| ServiceError::internal("creation scope without tenant"))?;

        if caller.role == Role::SuperAdmin
            && !TenantRepository::new(self.db).exists(tenant_id).await?
        {
            return Err(ServiceError::validation("company does not exist"));
        }
        Ok(tenant_id)
    }

    async fn ensure_category_in_tenant(
        &self,
        category_id: Option<i32>,
        tenant_id: i32,
    ) -> Result<(), ServiceError> {
        let Some(category_id) = category_id else {
            return Ok(());
        };
        let tenant_scope = Scope {
            tenant_id: Some(tenant_id),
            owner_user_id: None,
        };
        CategoryRepository::new(self.db)
            .find(category_id, &tenant_scope)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::validation("category_id does not refer to a category of this company"))
    }
}

fn pre_lookup_scope(
    caller: &Caller,
    action: Action,
    resource: &'static str,
) -> Result<Scope, ServiceError> {
    scope_for(caller, action)
        .into_result()
        .map_err(|r| ServiceError::denied(r, resource))
}

fn row_scope(
    caller: &Caller,
    action: Action,
    target: Target,
    resource: &'static str,
) -> Result<Scope, ServiceError> {
    authorize(caller, action, target)
        .into_result()
        .map_err(|r| ServiceError::denied(r, resource))
}
