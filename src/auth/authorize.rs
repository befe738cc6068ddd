//! Tenancy and ownership authorization.
//!
//! [`authorize`] is a pure decision function: given who is calling, what they
//! want to do, and the tenant/owner of the target, it either denies with a
//! reason or allows with a [`Scope`] that every subsequent query must carry.
//! It never touches storage.
//!
//! Rules, first match wins:
//! 1. `super_admin` is not tenant-scoped, except that creation needs an
//!    explicit target tenant.
//! 2. Everyone else is pinned to their own tenant; a client-supplied tenant
//!    on creation is replaced, not rejected.
//! 3. Listing and reading are tenant-wide for every role. Listing pending
//!    identities needs an admin role.
//! 4. Updates and deletes by a plain user are limited to rows they own.
//! 5. A target in another tenant is out of scope, which callers report as
//!    not found.
//! 6. Verifying or rejecting an identity needs an admin role and, below
//!    super admin, a same-tenant target.

use std::fmt;

use sea_orm::{ColumnTrait, Condition};

use super::role::Role;

/// Authenticated caller, as established by the authentication gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i32,
    pub role: Role,
    pub tenant_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    List,
    Read,
    Update,
    Delete,
    ListPending,
    Verify,
    Reject,
}

impl Action {
    fn requires_admin(self) -> bool {
        matches!(self, Action::ListPending | Action::Verify | Action::Reject)
    }

    fn is_mutation(self) -> bool {
        matches!(self, Action::Update | Action::Delete)
    }
}

/// Tenant and owner attributes of the thing being acted on. Fields are `None`
/// when unknown, e.g. before a lookup or for a creation without an explicit
/// tenant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Target {
    pub tenant_id: Option<i32>,
    pub owner_user_id: Option<i32>,
}

impl Target {
    pub fn new(tenant_id: i32, owner_user_id: i32) -> Self {
        Self {
            tenant_id: Some(tenant_id),
            owner_user_id: Some(owner_user_id),
        }
    }

    pub fn tenant(tenant_id: i32) -> Self {
        Self {
            tenant_id: Some(tenant_id),
            owner_user_id: None,
        }
    }

    pub fn requested_tenant(tenant_id: Option<i32>) -> Self {
        Self {
            tenant_id,
            owner_user_id: None,
        }
    }
}

/// Query predicate derived from an allow decision. `tenant_id: None` means
/// every tenant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scope {
    pub tenant_id: Option<i32>,
    pub owner_user_id: Option<i32>,
}

impl Scope {
    /// Whether a row with these attributes falls inside the scope.
    pub fn contains(&self, tenant_id: i32, owner_user_id: Option<i32>) -> bool {
        let tenant_ok = self.tenant_id.is_none_or(|t| t == tenant_id);
        let owner_ok = match (self.owner_user_id, owner_user_id) {
            (None, _) => true,
            (Some(required), Some(owner)) => required == owner,
            (Some(_), None) => false,
        };
        tenant_ok && owner_ok
    }

    /// The tenant a new row must be stamped with. Only meaningful for scopes
    /// returned by a `Create` decision, which always pin a tenant.
    pub fn creation_tenant(&self) -> Option<i32> {
        self.tenant_id
    }

    /// Turns the scope into a SeaORM condition over the given columns.
    pub fn condition<T, O>(&self, tenant_col: T, owner_col: O) -> Condition
    where
        T: ColumnTrait,
        O: ColumnTrait,
    {
        Condition::all()
            .add_option(self.tenant_id.map(|t| tenant_col.eq(t)))
            .add_option(self.owner_user_id.map(|o| owner_col.eq(o)))
    }

    /// Tenant-only condition, for tables without an owner column.
    pub fn tenant_condition<T: ColumnTrait>(&self, tenant_col: T) -> Condition {
        Condition::all().add_option(self.tenant_id.map(|t| tenant_col.eq(t)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// A super admin tried to create something without naming a tenant.
    MissingTenantContext,
    InsufficientRole,
    NotOwner,
    /// Target lives in another tenant; reported as not found.
    OutOfScope,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DenyReason::MissingTenantContext => "a target tenant_id is required for this role",
            DenyReason::InsufficientRole => "admin role required",
            DenyReason::NotOwner => "only the owner may modify this resource",
            DenyReason::OutOfScope => "target is outside the caller's scope",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow(Scope),
    Deny(DenyReason),
}

impl Decision {
    pub fn into_result(self) -> Result<Scope, DenyReason> {
        match self {
            Decision::Allow(scope) => Ok(scope),
            Decision::Deny(reason) => Err(reason),
        }
    }
}

/// Decides whether `caller` may perform `action` on `target`.
pub fn authorize(caller: &Caller, action: Action, target: Target) -> Decision {
    let decision = decide(caller, action, target);
    tracing::debug!(
        user_id = caller.user_id,
        tenant_id = caller.tenant_id,
        role = %caller.role,
        ?action,
        target_tenant = ?target.tenant_id,
        ?decision,
        "Authorization decision"
    );
    decision
}

/// Pre-lookup scope for `action`: the predicate to filter queries with
/// before any target row is known.
pub fn scope_for(caller: &Caller, action: Action) -> Decision {
    authorize(caller, action, Target::default())
}

fn decide(caller: &Caller, action: Action, target: Target) -> Decision {
    if action == Action::Create {
        let tenant_id = match caller.role {
            Role::SuperAdmin => match target.tenant_id {
                Some(tenant_id) => tenant_id,
                None => return Decision::Deny(DenyReason::MissingTenantContext),
            },
            Role::Admin | Role::User => caller.tenant_id,
        };
        return Decision::Allow(Scope {
            tenant_id: Some(tenant_id),
            owner_user_id: Some(caller.user_id),
        });
    }

    if action.requires_admin() && !caller.role.is_admin() {
        return Decision::Deny(DenyReason::InsufficientRole);
    }

    let tenant_scope = match caller.role {
        Role::SuperAdmin => None,
        Role::Admin | Role::User => Some(caller.tenant_id),
    };

    if let (Some(scope_tenant), Some(target_tenant)) = (tenant_scope, target.tenant_id)
        && scope_tenant != target_tenant
    {
        return Decision::Deny(DenyReason::OutOfScope);
    }

    let owner_scope = if action.is_mutation() && !caller.role.is_admin() {
        if target
            .owner_user_id
            .is_some_and(|owner| owner != caller.user_id)
        {
            return Decision::Deny(DenyReason::NotOwner);
        }
        Some(caller.user_id)
    } else {
        None
    };

    Decision::Allow(Scope {
        tenant_id: tenant_scope,
        owner_user_id: owner_scope,
    })
}
