//! Database migrations for the Inventory API.
//!
//! Tenants come first; every other table hangs off `tenants.id`.

pub use sea_orm_migration::prelude::*;

mod m2025_01_06_000001_create_tenants;
mod m2025_01_06_000002_create_users;
mod m2025_01_06_000003_create_categories;
mod m2025_01_06_000004_create_items;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_01_06_000001_create_tenants::Migration),
            Box::new(m2025_01_06_000002_create_users::Migration),
            Box::new(m2025_01_06_000003_create_categories::Migration),
            Box::new(m2025_01_06_000004_create_items::Migration),
        ]
    }
}
