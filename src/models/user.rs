//! Identity entity model
//!
//! Every identity belongs to exactly one tenant. `verified` gates login for
//! plain users who joined an existing tenant.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

use crate::auth::role::Role;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub username: String,

    /// Login identifier, matched exactly as stored
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 PHC string; never serialized
    pub password_hash: String,

    pub role: Role,

    pub tenant_id: i32,

    pub verified: bool,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Pending identities are unverified plain users awaiting approval.
    pub fn is_pending(&self) -> bool {
        !self.verified && self.role == Role::User
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tenant::Entity",
        from = "Column::TenantId",
        to = "super::tenant::Column::Id",
        on_delete = "Cascade"
    )]
    Tenant,
}

impl Related<super::tenant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
