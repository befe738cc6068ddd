//! Super admin seeding
//!
//! Creates the platform tenant and a verified `super_admin` identity the first
//! time the service starts with `SUPER_ADMIN_PASSWORD` configured. Later runs
//! are no-ops as long as any super admin exists.

use anyhow::{Context, Result};
use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::auth::Role;
use crate::auth::password::hash_password_blocking;
use crate::config::SuperAdminConfig;
use crate::repositories::{IdentityRepository, NewIdentity, TenantRepository};
use crate::services::validation;

/// What a seeding run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    AlreadyPresent,
    /// No password configured, nothing created.
    Skipped,
    Created { user_id: i32, tenant_id: i32 },
}

/// Seeds the super admin described by `config`.
pub async fn seed_super_admin(
    db: &DatabaseConnection,
    config: &SuperAdminConfig,
) -> Result<SeedOutcome> {
    if IdentityRepository::new(db)
        .exists_with_role(Role::SuperAdmin)
        .await?
    {
        log::info!("Super admin already exists, skipping seed");
        return Ok(SeedOutcome::AlreadyPresent);
    }

    let Some(password) = config.password.clone() else {
        log::warn!("SUPER_ADMIN_PASSWORD is not set; no super admin was created");
        return Ok(SeedOutcome::Skipped);
    };

    let email = validation::email(&config.email)
        .context("Invalid super admin email")?
        .to_string();
    let username = validation::username(&config.username)
        .context("Invalid super admin username")?
        .to_string();
    validation::password(&password).context("Invalid super admin password")?;

    let password_hash = hash_password_blocking(password)
        .await
        .context("Failed to hash super admin password")?;

    let txn = db.begin().await?;

    let tenants = TenantRepository::new(&txn);
    let tenant = match tenants.find_by_name(config.tenant.trim()).await? {
        Some(existing) => existing,
        None => tenants
            .create(&config.tenant)
            .await
            .context("Failed to create platform tenant")?,
    };

    let identity = IdentityRepository::new(&txn)
        .create(NewIdentity {
            username,
            email,
            password_hash,
            role: Role::SuperAdmin,
            tenant_id: tenant.id,
            verified: Role::SuperAdmin.verified_on_creation(),
        })
        .await
        .context("Failed to create super admin")?;

    txn.commit().await?;

    log::info!(
        "Super admin '{}' created in tenant '{}'",
        identity.email,
        tenant.name
    );
    Ok(SeedOutcome::Created {
        user_id: identity.id,
        tenant_id: tenant.id,
    })
}
