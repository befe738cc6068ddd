//! Registration, login and the pending-identity approval workflow.
//!
//! Identity lifecycle:
//!
//! ```text
//! Unregistered --signup(New tenant)------> Verified admin
//! Unregistered --signup(Existing tenant)--> Pending --approve--> Verified
//!                                                    \--reject---> (deleted)
//! ```

use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::auth::token::{IssuedToken, TokenService};
use crate::auth::{Action, Caller, Role, Target, authorize, scope_for};
use crate::error::{RepositoryError, ServiceError};
use crate::models::{tenant, user};
use crate::repositories::{IdentityRepository, NewIdentity, TenantRepository};
use crate::services::validation;

const USER_RESOURCE: &str = "User";

/// Which tenant a signup attaches to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantRef {
    /// Create a tenant; the name defaults to `"<username>'s Company"`.
    New { name: Option<String> },
    /// Join an existing tenant and wait for approval.
    Existing(i32),
}

#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub tenant: TenantRef,
}

#[derive(Debug, Clone)]
pub struct SignupOutcome {
    pub identity: user::Model,
    pub tenant: tenant::Model,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: IssuedToken,
    pub identity: user::Model,
    pub tenant: tenant::Model,
}

pub fn default_tenant_name(username: &str) -> String {
    format!("{username}'s Company")
}

pub struct AccountService<'a> {
    db: &'a DatabaseConnection,
    tokens: &'a TokenService,
}

impl<'a> AccountService<'a> {
    pub fn new(db: &'a DatabaseConnection, tokens: &'a TokenService) -> Self {
        Self { db, tokens }
    }

    /// Registers a new identity.
    ///
    /// The email pre-check only saves a password hash on the common path; the
    /// unique index on `users.email` is what actually prevents duplicates.
    pub async fn signup(&self, request: SignupRequest) -> Result<SignupOutcome, ServiceError> {
        let username = validation::username(&request.username)?.to_string();
        let email = validation::email(&request.email)?.to_string();
        validation::password(&request.password)?;

        if IdentityRepository::new(self.db).email_exists(&email).await? {
            return Err(ServiceError::DuplicateEmail);
        }

        let password_hash = hash_password_blocking(request.password)
            .await
            .map_err(|e| ServiceError::internal(e.to_string()))?;

        let outcome = match request.tenant {
            TenantRef::Existing(tenant_id) => {
                self.join_tenant(tenant_id, username, email, password_hash)
                    .await?
            }
            TenantRef::New { name } => {
                let name = name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| default_tenant_name(&username));
                self.found_tenant(name, username, email, password_hash)
                    .await?
            }
        };

        tracing::info!(
            user_id = outcome.identity.id,
            tenant_id = outcome.tenant.id,
            role = %outcome.identity.role,
            verified = outcome.identity.verified,
            "Identity registered"
        );
        Ok(outcome)
    }

    async fn join_tenant(
        &self,
        tenant_id: i32,
        username: String,
        email: String,
        password_hash: String,
    ) -> Result<SignupOutcome, ServiceError> {
        let tenant = TenantRepository::new(self.db)
            .find_by_id(tenant_id)
            .await?
            .ok_or_else(|| ServiceError::validation("company does not exist"))?;

        let identity = IdentityRepository::new(self.db)
            .create(NewIdentity {
                username,
                email,
                password_hash,
                role: Role::User,
                tenant_id: tenant.id,
                verified: Role::User.verified_on_creation(),
            })
            .await
            .map_err(|e| unique_as(e, ServiceError::DuplicateEmail))?;

        Ok(SignupOutcome { identity, tenant })
    }

    /// Creates the tenant and its first admin atomically.
    async fn found_tenant(
        &self,
        tenant_name: String,
        username: String,
        email: String,
        password_hash: String,
    ) -> Result<SignupOutcome, ServiceError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let tenant = TenantRepository::new(&txn)
            .create(&tenant_name)
            .await
            .map_err(|e| unique_as(e, ServiceError::DuplicateTenant))?;

        let identity = IdentityRepository::new(&txn)
            .create(NewIdentity {
                username,
                email,
                password_hash,
                role: Role::Admin,
                tenant_id: tenant.id,
                verified: Role::Admin.verified_on_creation(),
            })
            .await
            .map_err(|e| unique_as(e, ServiceError::DuplicateEmail))?;

        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(SignupOutcome { identity, tenant })
    }

    /// Authenticates by email and password. Unknown email and wrong password
    /// are indistinguishable; correct credentials of a pending identity are
    /// still refused.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ServiceError> {
        let email = email.trim();
        let Some(identity) = IdentityRepository::new(self.db)
            .find_by_email(email)
            .await?
        else {
            tracing::info!("Login failed: unknown email");
            return Err(ServiceError::InvalidCredentials);
        };

        let matches = verify_password_blocking(password.to_string(), identity.password_hash.clone())
            .await
            .map_err(|e| ServiceError::internal(e.to_string()))?;
        if !matches {
            tracing::info!(user_id = identity.id, "Login failed: wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        if identity.is_pending() {
            tracing::info!(user_id = identity.id, "Login refused: pending approval");
            return Err(ServiceError::PendingApproval);
        }

        let tenant = TenantRepository::new(self.db)
            .find_by_id(identity.tenant_id)
            .await?
            .ok_or_else(|| ServiceError::internal("identity references a missing tenant"))?;

        let caller = Caller {
            user_id: identity.id,
            role: identity.role,
            tenant_id: identity.tenant_id,
        };
        let token = self
            .tokens
            .issue(&caller)
            .map_err(|e| ServiceError::internal(e.to_string()))?;

        tracing::info!(
            user_id = identity.id,
            tenant_id = identity.tenant_id,
            role = %identity.role,
            "Login succeeded"
        );
        Ok(LoginOutcome {
            token,
            identity,
            tenant,
        })
    }

    /// Marks a pending identity verified. Approving an already verified
    /// identity is a no-op.
    pub async fn approve(&self, caller: &Caller, target_id: i32) -> Result<user::Model, ServiceError> {
        let identity = self.load_for(caller, Action::Verify, target_id).await?;
        let verified = IdentityRepository::new(self.db)
            .mark_verified(identity)
            .await?;

        tracing::info!(
            approver_id = caller.user_id,
            user_id = verified.id,
            tenant_id = verified.tenant_id,
            "Identity approved"
        );
        Ok(verified)
    }

    /// Deletes a pending identity. Verified identities cannot be rejected and
    /// are reported as not found.
    pub async fn reject(&self, caller: &Caller, target_id: i32) -> Result<(), ServiceError> {
        let identity = self.load_for(caller, Action::Reject, target_id).await?;
        if !identity.is_pending() {
            return Err(ServiceError::NotFound(USER_RESOURCE));
        }

        let scope = authorize(
            caller,
            Action::Reject,
            Target::new(identity.tenant_id, identity.id),
        )
        .into_result()
        .map_err(|r| ServiceError::denied(r, USER_RESOURCE))?;

        let deleted = IdentityRepository::new(self.db)
            .delete_pending(identity.id, &scope)
            .await?;
        if !deleted {
            return Err(ServiceError::NotFound(USER_RESOURCE));
        }

        tracing::info!(
            rejecter_id = caller.user_id,
            user_id = identity.id,
            tenant_id = identity.tenant_id,
            "Identity rejected"
        );
        Ok(())
    }

    /// Pending identities visible to `caller`.
    pub async fn list_pending(&self, caller: &Caller) -> Result<Vec<user::Model>, ServiceError> {
        let scope = scope_for(caller, Action::ListPending)
            .into_result()
            .map_err(|r| ServiceError::denied(r, USER_RESOURCE))?;
        Ok(IdentityRepository::new(self.db).list_pending(&scope).await?)
    }

    /// Companies are public; signup needs their ids.
    pub async fn list_tenants(&self) -> Result<Vec<tenant::Model>, ServiceError> {
        Ok(TenantRepository::new(self.db).list().await?)
    }

    /// Role check, scoped lookup, then the same-tenant check against the row.
    async fn load_for(
        &self,
        caller: &Caller,
        action: Action,
        target_id: i32,
    ) -> Result<user::Model, ServiceError> {
        let scope = scope_for(caller, action)
            .into_result()
            .map_err(|r| ServiceError::denied(r, USER_RESOURCE))?;

        let identity = IdentityRepository::new(self.db)
            .find_in_scope(target_id, &scope)
            .await?
            .ok_or(ServiceError::NotFound(USER_RESOURCE))?;

        authorize(
            caller,
            action,
            Target::new(identity.tenant_id, identity.id),
        )
        .into_result()
        .map_err(|r| ServiceError::denied(r, USER_RESOURCE))?;

        Ok(identity)
    }
}

fn unique_as(error: RepositoryError, on_unique: ServiceError) -> ServiceError {
    if error.is_unique_violation() {
        on_unique
    } else {
        error.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::setup_db;
    use chrono::Duration;

    const SECRET: &str = "account-test-secret-0123456789abcdef";

    fn identity(email: &str, tenant_id: i32, role: Role) -> NewIdentity {
        NewIdentity {
            username: "existing".to_string(),
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role,
            tenant_id,
            verified: true,
        }
    }

    #[tokio::test]
    async fn join_maps_email_race_to_duplicate_email() {
        let db = setup_db().await;
        let tokens = TokenService::new(SECRET, Duration::hours(1)).unwrap();
        let service = AccountService::new(&db, &tokens);

        let tenant = TenantRepository::new(&db).create("Acme").await.unwrap();
        // Lands after the signup pre-check would have run.
        IdentityRepository::new(&db)
            .create(identity("bob@acme.test", tenant.id, Role::Admin))
            .await
            .unwrap();

        let result = service
            .join_tenant(
                tenant.id,
                "bob".to_string(),
                "bob@acme.test".to_string(),
                "hash".to_string(),
            )
            .await;

        assert!(matches!(result, Err(ServiceError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn found_tenant_email_race_leaves_no_orphan_tenant() {
        let db = setup_db().await;
        let tokens = TokenService::new(SECRET, Duration::hours(1)).unwrap();
        let service = AccountService::new(&db, &tokens);

        let other = TenantRepository::new(&db).create("Globex").await.unwrap();
        IdentityRepository::new(&db)
            .create(identity("alice@acme.test", other.id, Role::Admin))
            .await
            .unwrap();

        let result = service
            .found_tenant(
                "Acme".to_string(),
                "alice".to_string(),
                "alice@acme.test".to_string(),
                "hash".to_string(),
            )
            .await;

        assert!(matches!(result, Err(ServiceError::DuplicateEmail)));
        assert!(
            TenantRepository::new(&db)
                .find_by_name("Acme")
                .await
                .unwrap()
                .is_none()
        );
    }
}
